use crate::domain::jobs::{JobRepository, JobStatus, JobUpdate, Location};
use crate::shared::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use time::Date;
use utoipa::ToSchema;
use validator::Validate;

/// Partial update. Present `tech_stacks`/`job_categories` replace the whole set.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateJobRequest {
    #[validate(length(min = 1, max = 255, message = "Title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Job description must not be empty"))]
    pub job_description: Option<String>,
    pub experience_level: Option<String>,
    pub education_level: Option<String>,
    pub employment_type: Option<String>,
    pub salary_info: Option<String>,
    pub deadline_date: Option<Date>,
    pub status: Option<JobStatus>,
    pub location: Option<Location>,
    pub tech_stacks: Option<Vec<String>>,
    pub job_categories: Option<Vec<String>>,
}

impl From<UpdateJobRequest> for JobUpdate {
    fn from(req: UpdateJobRequest) -> Self {
        JobUpdate {
            title: req.title,
            job_description: req.job_description,
            experience_level: req.experience_level,
            education_level: req.education_level,
            employment_type: req.employment_type,
            salary_info: req.salary_info,
            deadline_date: req.deadline_date,
            status: req.status,
            location: req.location,
            tech_stacks: req.tech_stacks,
            job_categories: req.job_categories,
        }
    }
}

pub struct UpdateJobUseCase {
    job_repo: Arc<dyn JobRepository>,
}

impl UpdateJobUseCase {
    pub fn new(job_repo: Arc<dyn JobRepository>) -> Self {
        Self { job_repo }
    }

    #[tracing::instrument(skip(self, req))]
    pub async fn execute(&self, id: i64, req: UpdateJobRequest) -> Result<(), AppError> {
        let update = JobUpdate::from(req);
        if update.is_empty() {
            return Err(AppError::BadRequest("No input data provided".to_string()));
        }

        let found = self
            .job_repo
            .update(id, update)
            .await
            .map_err(AppError::InternalServerError)?;
        if !found {
            return Err(AppError::NotFound("Job posting not found".to_string()));
        }

        Ok(())
    }
}
