use crate::domain::jobs::{JobDetail, JobRepository, RelatedJob};
use crate::shared::error::AppError;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

const RELATED_LIMIT: i64 = 5;

#[derive(Debug, Serialize, ToSchema)]
pub struct JobDetailResponse {
    pub job: JobDetail,
    /// Up to five random active postings from the same company or sharing a
    /// tech stack
    pub related: Vec<RelatedJob>,
}

pub struct GetJobUseCase {
    job_repo: Arc<dyn JobRepository>,
}

impl GetJobUseCase {
    pub fn new(job_repo: Arc<dyn JobRepository>) -> Self {
        Self { job_repo }
    }

    /// Counts the view, then loads the posting and its related postings
    #[tracing::instrument(skip(self))]
    pub async fn execute(&self, id: i64) -> Result<JobDetailResponse, AppError> {
        self.job_repo
            .increment_view_count(id)
            .await
            .map_err(AppError::InternalServerError)?;

        let job = self
            .job_repo
            .find_detail(id)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or_else(|| AppError::NotFound("Job posting not found".to_string()))?;

        let related = self
            .job_repo
            .find_related(id, job.company_id, RELATED_LIMIT)
            .await
            .map_err(AppError::InternalServerError)?;

        Ok(JobDetailResponse { job, related })
    }
}
