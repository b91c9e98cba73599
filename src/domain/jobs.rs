use crate::shared::pagination::{PageRequest, SortOrder};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use time::{Date, OffsetDateTime};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Closed,
    Deleted,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Closed => "closed",
            JobStatus::Deleted => "deleted",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(JobStatus::Active),
            "closed" => Ok(JobStatus::Closed),
            "deleted" => Ok(JobStatus::Deleted),
            other => Err(format!("unknown job status: {}", other)),
        }
    }
}

impl TryFrom<String> for JobStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Columns a job listing may be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobSortField {
    #[default]
    CreatedAt,
    ViewCount,
    DeadlineDate,
    Title,
}

impl JobSortField {
    /// Unknown fields fall back to `created_at`
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("view_count") => JobSortField::ViewCount,
            Some("deadline_date") => JobSortField::DeadlineDate,
            Some("title") => JobSortField::Title,
            _ => JobSortField::CreatedAt,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            JobSortField::CreatedAt => "jp.created_at",
            JobSortField::ViewCount => "jp.view_count",
            JobSortField::DeadlineDate => "jp.deadline_date",
            JobSortField::Title => "jp.title",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobFilters {
    /// Matches title or description
    pub keyword: Option<String>,
    pub company: Option<String>,
    pub employment_type: Option<String>,
    /// Matches title
    pub position: Option<String>,
    pub location_id: Option<i64>,
    pub salary_info: Option<String>,
    pub experience_level: Option<String>,
    pub tech_stacks: Vec<String>,
    pub job_categories: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct JobSearch {
    pub filters: JobFilters,
    pub sort_field: JobSortField,
    pub sort_order: SortOrder,
    pub page: PageRequest,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct JobSummary {
    pub posting_id: i64,
    pub company_name: String,
    pub title: String,
    pub job_description: String,
    pub experience_level: Option<String>,
    pub education_level: Option<String>,
    pub employment_type: Option<String>,
    pub salary_info: Option<String>,
    pub location_id: Option<i64>,
    pub location: Option<String>,
    pub deadline_date: Option<Date>,
    pub view_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub tech_stacks: Vec<String>,
    pub job_categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct JobDetail {
    pub posting_id: i64,
    pub company_id: i64,
    pub company_name: String,
    pub title: String,
    pub job_description: String,
    pub experience_level: Option<String>,
    pub education_level: Option<String>,
    pub employment_type: Option<String>,
    pub salary_info: Option<String>,
    pub location_id: Option<i64>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub deadline_date: Option<Date>,
    #[sqlx(try_from = "String")]
    pub status: JobStatus,
    pub view_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub tech_stacks: Vec<String>,
    pub job_categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RelatedJob {
    pub posting_id: i64,
    pub title: String,
    pub company_name: String,
}

/// A city with an optional district; created on first use
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct Location {
    #[schema(example = "Seoul")]
    pub city: String,
    #[schema(example = "Gangnam-gu")]
    pub district: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub company_id: i64,
    pub title: String,
    pub job_description: String,
    pub experience_level: Option<String>,
    pub education_level: Option<String>,
    pub employment_type: Option<String>,
    pub salary_info: Option<String>,
    pub deadline_date: Option<Date>,
    pub location: Option<Location>,
    pub tech_stacks: Vec<String>,
    pub job_categories: Vec<String>,
}

/// Partial update; `None` leaves a column untouched, `Some` list fields
/// replace the whole association
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub title: Option<String>,
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

impl JobUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.job_description.is_none()
            && self.experience_level.is_none()
            && self.education_level.is_none()
            && self.employment_type.is_none()
            && self.salary_info.is_none()
            && self.deadline_date.is_none()
            && self.status.is_none()
            && self.location.is_none()
            && self.tech_stacks.is_none()
            && self.job_categories.is_none()
    }
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn search(&self, search: &JobSearch) -> Result<Vec<JobSummary>, anyhow::Error>;
    async fn find_detail(&self, id: i64) -> Result<Option<JobDetail>, anyhow::Error>;
    async fn increment_view_count(&self, id: i64) -> Result<(), anyhow::Error>;
    async fn find_related(
        &self,
        id: i64,
        company_id: i64,
        limit: i64,
    ) -> Result<Vec<RelatedJob>, anyhow::Error>;
    async fn company_exists(&self, company_id: i64) -> Result<bool, anyhow::Error>;
    async fn create(&self, job: NewJob) -> Result<i64, anyhow::Error>;
    async fn update(&self, id: i64, update: JobUpdate) -> Result<bool, anyhow::Error>;
    async fn find_status(&self, id: i64) -> Result<Option<JobStatus>, anyhow::Error>;
    async fn mark_deleted(&self, id: i64) -> Result<(), anyhow::Error>;
    /// Exists and is not soft-deleted
    async fn is_open(&self, id: i64) -> Result<bool, anyhow::Error>;
}
