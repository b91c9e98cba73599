use crate::domain::jobs::{JobRepository, JobStatus};
use crate::shared::error::AppError;
use std::sync::Arc;

/// Soft delete: the row stays, its status becomes `deleted`
pub struct DeleteJobUseCase {
    job_repo: Arc<dyn JobRepository>,
}

impl DeleteJobUseCase {
    pub fn new(job_repo: Arc<dyn JobRepository>) -> Self {
        Self { job_repo }
    }

    #[tracing::instrument(skip(self))]
    pub async fn execute(&self, id: i64) -> Result<(), AppError> {
        let status = self
            .job_repo
            .find_status(id)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or_else(|| AppError::NotFound("Job posting not found".to_string()))?;

        if status == JobStatus::Deleted {
            return Err(AppError::BadRequest(
                "Job posting already deleted".to_string(),
            ));
        }

        self.job_repo
            .mark_deleted(id)
            .await
            .map_err(AppError::InternalServerError)
    }
}
