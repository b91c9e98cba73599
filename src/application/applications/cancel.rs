use crate::domain::applications::ApplicationRepository;
use crate::domain::users::CurrentUser;
use crate::shared::error::AppError;
use std::sync::Arc;

pub struct CancelApplicationUseCase {
    application_repo: Arc<dyn ApplicationRepository>,
}

impl CancelApplicationUseCase {
    pub fn new(application_repo: Arc<dyn ApplicationRepository>) -> Self {
        Self { application_repo }
    }

    #[tracing::instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn execute(&self, user: &CurrentUser, application_id: i64) -> Result<(), AppError> {
        let owner = self
            .application_repo
            .find_owner(application_id)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

        if owner != user.id {
            return Err(AppError::Forbidden(
                "Not authorized to cancel this application".to_string(),
            ));
        }

        self.application_repo
            .delete(application_id)
            .await
            .map_err(AppError::InternalServerError)?;

        Ok(())
    }
}
