use crate::shared::pagination::{PageRequest, SortOrder};
use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ApplicationSummary {
    pub application_id: i64,
    pub posting_id: i64,
    pub title: String,
    pub company_name: String,
    #[schema(example = "pending")]
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub applied_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub user_id: i64,
    pub posting_id: i64,
    pub resume_id: Option<i64>,
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApplicationQuery {
    pub user_id: i64,
    pub status: Option<String>,
    pub order: SortOrder,
    pub page: PageRequest,
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn exists(&self, user_id: i64, posting_id: i64) -> Result<bool, anyhow::Error>;
    async fn resume_owner(&self, resume_id: i64) -> Result<Option<i64>, anyhow::Error>;
    async fn create(&self, application: NewApplication) -> Result<i64, anyhow::Error>;
    async fn list(
        &self,
        query: &ApplicationQuery,
    ) -> Result<Vec<ApplicationSummary>, anyhow::Error>;
    async fn find_owner(&self, application_id: i64) -> Result<Option<i64>, anyhow::Error>;
    async fn delete(&self, application_id: i64) -> Result<bool, anyhow::Error>;
}
