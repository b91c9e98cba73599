use crate::application::auth::token_utils::{TokenResponse, issue_token_pair};
use crate::domain::auth::TokenService;
use crate::domain::password::PasswordHashingService;
use crate::domain::users::UserRepository;
use crate::shared::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Form logins send the email as `username`
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LoginRequest {
    #[serde(alias = "username")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

pub struct LoginUseCase {
    user_repo: Arc<dyn UserRepository>,
    token_service: Arc<dyn TokenService>,
    password_service: Arc<dyn PasswordHashingService>,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".to_string())
}

impl LoginUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        token_service: Arc<dyn TokenService>,
        password_service: Arc<dyn PasswordHashingService>,
    ) -> Self {
        Self {
            user_repo,
            token_service,
            password_service,
        }
    }

    #[tracing::instrument(skip(self, req), fields(email = %req.email))]
    pub async fn execute(&self, req: LoginRequest) -> Result<TokenResponse, AppError> {
        let Some(user) = self
            .user_repo
            .find_by_email(&req.email)
            .await
            .map_err(AppError::InternalServerError)?
        else {
            tracing::warn!("login for unknown email");
            return Err(invalid_credentials());
        };

        let valid_password = self
            .password_service
            .verify_password(&req.password, &user.password_hash)
            .unwrap_or_else(|e| {
                tracing::error!(user_id = user.id, error = %e, "stored credential rejected");
                false
            });
        if !valid_password {
            tracing::warn!(user_id = user.id, "login with wrong password");
            return Err(invalid_credentials());
        }

        if !user.status.is_active() {
            tracing::warn!(user_id = user.id, status = %user.status, "login for non-active account");
            return Err(invalid_credentials());
        }

        self.user_repo
            .record_login(user.id)
            .await
            .map_err(AppError::InternalServerError)?;

        issue_token_pair(user.id, self.token_service.as_ref())
    }
}
