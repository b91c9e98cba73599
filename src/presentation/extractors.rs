use crate::infrastructure::db::DbSession;
use crate::infrastructure::state::AppState;
use crate::shared::error::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};

/// The request's database session.
///
/// Reuses the session the auth middleware already bound to this request, so a
/// protected handler never holds two pooled connections at once.
impl FromRequestParts<AppState> for DbSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(DbSession::for_request(&mut parts.extensions, &state.pool).await?)
    }
}
