use crate::shared::pagination::{PageRequest, SortOrder};
use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use utoipa::ToSchema;

/// A bookmarked posting with enough detail to render a card
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BookmarkedJob {
    pub bookmark_id: i64,
    pub posting_id: i64,
    pub title: String,
    pub job_description: String,
    pub experience_level: Option<String>,
    pub education_level: Option<String>,
    pub employment_type: Option<String>,
    pub salary_info: Option<String>,
    pub location: Option<String>,
    pub deadline_date: Option<Date>,
    pub view_count: i64,
    pub company_name: String,
    pub tech_stacks: Vec<String>,
    pub job_categories: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    async fn find(&self, user_id: i64, posting_id: i64) -> Result<Option<i64>, anyhow::Error>;
    async fn add(&self, user_id: i64, posting_id: i64) -> Result<i64, anyhow::Error>;
    async fn remove(&self, bookmark_id: i64) -> Result<bool, anyhow::Error>;
    async fn list(
        &self,
        user_id: i64,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<Vec<BookmarkedJob>, anyhow::Error>;
}
