use crate::domain::password::PasswordHashingService;
use crate::domain::users::{CurrentUser, ProfileUpdate, UserRepository};
use crate::shared::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use time::Date;
use utoipa::ToSchema;
use validator::Validate;

/// Any subset of the profile; a password change needs both password fields
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(max = 20, message = "Phone number is too long"))]
    #[schema(example = "010-1234-5678")]
    pub phone: Option<String>,
    pub birth_date: Option<Date>,
    pub current_password: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: Option<String>,
}

pub struct UpdateProfileUseCase {
    user_repo: Arc<dyn UserRepository>,
    password_service: Arc<dyn PasswordHashingService>,
}

impl UpdateProfileUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        password_service: Arc<dyn PasswordHashingService>,
    ) -> Self {
        Self {
            user_repo,
            password_service,
        }
    }

    #[tracing::instrument(skip(self, user, req), fields(user_id = user.id))]
    pub async fn execute(
        &self,
        user: &CurrentUser,
        req: UpdateProfileRequest,
    ) -> Result<(), AppError> {
        let password_hash = match (req.current_password, req.new_password) {
            (None, None) => None,
            (Some(current), Some(new)) => Some(self.change_password(user.id, &current, &new).await?),
            _ => {
                return Err(AppError::BadRequest(
                    "Both current_password and new_password are required".to_string(),
                ));
            }
        };

        let update = ProfileUpdate {
            name: req.name,
            phone: req.phone,
            birth_date: req.birth_date,
            password_hash,
        };
        if update.is_empty() {
            return Err(AppError::BadRequest("No valid fields to update".to_string()));
        }

        let updated = self
            .user_repo
            .update_profile(user.id, update)
            .await
            .map_err(AppError::InternalServerError)?;
        if !updated {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(())
    }

    async fn change_password(
        &self,
        user_id: i64,
        current: &str,
        new: &str,
    ) -> Result<String, AppError> {
        let stored = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let matches = self
            .password_service
            .verify_password(current, &stored.password_hash)
            .map_err(AppError::InternalServerError)?;
        if !matches {
            return Err(AppError::BadRequest(
                "Current password is incorrect".to_string(),
            ));
        }

        self.password_service
            .hash_password(new)
            .map_err(AppError::InternalServerError)
    }
}
