use crate::domain::auth::TokenService;
use crate::domain::password::PasswordHashingService;
use crate::infrastructure::db::DbPool;
use std::sync::Arc;

/// Shared by every request; repositories are built per request on top of the
/// request's own `DbSession`.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub token_service: Arc<dyn TokenService>,
    pub password_service: Arc<dyn PasswordHashingService>,
}

impl AppState {
    pub fn new(
        pool: DbPool,
        token_service: Arc<dyn TokenService>,
        password_service: Arc<dyn PasswordHashingService>,
    ) -> Self {
        Self {
            pool,
            token_service,
            password_service,
        }
    }
}
