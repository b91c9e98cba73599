use crate::application::auth::token_utils::{TokenResponse, issue_token_pair};
use crate::domain::auth::TokenService;
use crate::domain::password::PasswordHashingService;
use crate::domain::users::{NewUser, UserRepository};
use crate::shared::error::{AppError, conflict_on_duplicate};
use serde::Deserialize;
use std::sync::Arc;
use time::Date;
use validator::Validate;

const DUPLICATE_EMAIL: &str = "Email already registered";

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "jane@example.com")]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[validate(length(max = 20, message = "Phone number is too long"))]
    pub phone: Option<String>,

    /// `YYYY-MM-DD`
    pub birth_date: Option<Date>,
}

pub struct RegisterUseCase {
    user_repo: Arc<dyn UserRepository>,
    token_service: Arc<dyn TokenService>,
    password_service: Arc<dyn PasswordHashingService>,
}

impl RegisterUseCase {
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
    pub async fn execute(&self, req: RegisterRequest) -> Result<TokenResponse, AppError> {
        if self
            .user_repo
            .find_by_email(&req.email)
            .await
            .map_err(AppError::InternalServerError)?
            .is_some()
        {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }

        let password_hash = self
            .password_service
            .hash_password(&req.password)
            .map_err(AppError::InternalServerError)?;

        let user = self
            .user_repo
            .create(NewUser {
                email: req.email,
                password_hash,
                name: req.name,
                phone: req.phone,
                birth_date: req.birth_date,
            })
            .await
            .map_err(conflict_on_duplicate(DUPLICATE_EMAIL))?;

        tracing::info!(user_id = user.id, "user registered");
        issue_token_pair(user.id, self.token_service.as_ref())
    }
}
