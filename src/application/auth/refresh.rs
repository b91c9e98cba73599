use crate::application::auth::gate::{AuthFailure, load_active_user};
use crate::application::auth::token_utils::{TokenResponse, issue_token_pair};
use crate::domain::auth::{TokenService, TokenType};
use crate::domain::users::{CurrentUser, UserRepository};
use crate::shared::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

pub struct RefreshTokenUseCase {
    user_repo: Arc<dyn UserRepository>,
    token_service: Arc<dyn TokenService>,
}

impl RefreshTokenUseCase {
    pub fn new(user_repo: Arc<dyn UserRepository>, token_service: Arc<dyn TokenService>) -> Self {
        Self {
            user_repo,
            token_service,
        }
    }

    /// Trade a refresh token for a new pair; the account must still be active
    #[tracing::instrument(skip(self, req))]
    pub async fn execute(&self, req: RefreshTokenRequest) -> Result<TokenResponse, AppError> {
        let user = self.authorize(&req.refresh_token).await.map_err(|failure| {
            tracing::warn!(cause = %failure, "refresh rejected");
            match failure {
                AuthFailure::Lookup(e) => AppError::InternalServerError(e),
                _ => AppError::Unauthorized("Invalid refresh token".to_string()),
            }
        })?;

        issue_token_pair(user.id, self.token_service.as_ref())
    }

    async fn authorize(&self, refresh_token: &str) -> Result<CurrentUser, AuthFailure> {
        let subject = self
            .token_service
            .validate(refresh_token, TokenType::Refresh)?;
        let user_id = subject
            .parse::<i64>()
            .map_err(|_| AuthFailure::UserNotFound(subject))?;

        load_active_user(user_id, self.user_repo.as_ref()).await
    }
}
