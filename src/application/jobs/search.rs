use crate::domain::jobs::{JobFilters, JobRepository, JobSearch, JobSortField, JobSummary};
use crate::shared::error::AppError;
use crate::shared::pagination::{PAGE_SIZE, PageRequest, SortOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// Query string of `GET /jobs`. Blank strings count as absent.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListJobsQuery {
    /// Matches title or description
    pub keyword: Option<String>,
    /// Company name, partial match
    pub company: Option<String>,
    pub employment_type: Option<String>,
    /// Title, partial match
    pub position: Option<String>,
    pub location_id: Option<i64>,
    pub salary_info: Option<String>,
    pub experience_level: Option<String>,
    /// Any of these tech stacks, e.g. `tech_stacks[0]=Rust`
    #[serde(default)]
    pub tech_stacks: Vec<String>,
    /// Any of these categories
    #[serde(default)]
    pub job_categories: Vec<String>,
    /// `created_at` | `view_count` | `deadline_date` | `title`
    pub sort_field: Option<String>,
    /// `asc` | `desc`
    pub sort_order: Option<String>,
    pub page: Option<i64>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<ListJobsQuery> for JobSearch {
    fn from(query: ListJobsQuery) -> Self {
        JobSearch {
            filters: JobFilters {
                keyword: present(query.keyword),
                company: present(query.company),
                employment_type: present(query.employment_type),
                position: present(query.position),
                location_id: query.location_id,
                salary_info: present(query.salary_info),
                experience_level: present(query.experience_level),
                tech_stacks: query.tech_stacks,
                job_categories: query.job_categories,
            },
            sort_field: JobSortField::from_param(query.sort_field.as_deref()),
            sort_order: SortOrder::from_param(query.sort_order.as_deref()),
            page: query.page.map(PageRequest::new).unwrap_or_default(),
        }
    }
}

/// Listing metadata echoed back next to the postings
#[derive(Debug, Serialize, ToSchema)]
pub struct JobListMeta {
    pub page: i64,
    pub page_size: i64,
    pub sort_field: JobSortField,
    pub sort_order: SortOrder,
}

pub struct JobListing {
    pub jobs: Vec<JobSummary>,
    pub meta: JobListMeta,
}

pub struct SearchJobsUseCase {
    job_repo: Arc<dyn JobRepository>,
}

impl SearchJobsUseCase {
    pub fn new(job_repo: Arc<dyn JobRepository>) -> Self {
        Self { job_repo }
    }

    #[tracing::instrument(skip(self, query))]
    pub async fn execute(&self, query: ListJobsQuery) -> Result<JobListing, AppError> {
        let search = JobSearch::from(query);

        let jobs = self
            .job_repo
            .search(&search)
            .await
            .map_err(AppError::InternalServerError)?;

        Ok(JobListing {
            jobs,
            meta: JobListMeta {
                page: search.page.number(),
                page_size: PAGE_SIZE,
                sort_field: search.sort_field,
                sort_order: search.sort_order,
            },
        })
    }
}
