use crate::domain::jobs::{JobRepository, Location, NewJob};
use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::Date;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateJobRequest {
    pub company_id: i64,
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    #[schema(example = "Backend Engineer (Rust)")]
    pub title: String,
    #[validate(length(min = 1, message = "Job description is required"))]
    pub job_description: String,
    pub experience_level: Option<String>,
    pub education_level: Option<String>,
    pub employment_type: Option<String>,
    pub salary_info: Option<String>,
    pub deadline_date: Option<Date>,
    pub location: Option<Location>,
    #[serde(default)]
    pub tech_stacks: Vec<String>,
    #[serde(default)]
    pub job_categories: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedJob {
    pub posting_id: i64,
}

pub struct CreateJobUseCase {
    job_repo: Arc<dyn JobRepository>,
}

impl CreateJobUseCase {
    pub fn new(job_repo: Arc<dyn JobRepository>) -> Self {
        Self { job_repo }
    }

    #[tracing::instrument(skip(self, req), fields(company_id = req.company_id))]
    pub async fn execute(&self, req: CreateJobRequest) -> Result<CreatedJob, AppError> {
        if !self
            .job_repo
            .company_exists(req.company_id)
            .await
            .map_err(AppError::InternalServerError)?
        {
            return Err(AppError::NotFound("Company not found".to_string()));
        }

        let posting_id = self
            .job_repo
            .create(NewJob {
                company_id: req.company_id,
                title: req.title,
                job_description: req.job_description,
                experience_level: req.experience_level,
                education_level: req.education_level,
                employment_type: req.employment_type,
                salary_info: req.salary_info,
                deadline_date: req.deadline_date,
                location: req.location,
                tech_stacks: req.tech_stacks,
                job_categories: req.job_categories,
            })
            .await
            .map_err(AppError::InternalServerError)?;

        tracing::info!(posting_id, "job posting created");
        Ok(CreatedJob { posting_id })
    }
}
