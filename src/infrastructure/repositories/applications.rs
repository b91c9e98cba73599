use crate::domain::applications::{
    ApplicationQuery, ApplicationRepository, ApplicationSummary, NewApplication,
};
use crate::infrastructure::db::DbSession;
use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

pub fn build_list_query(query: &ApplicationQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new(
        r#"
        SELECT a.application_id, a.posting_id, jp.title, c.name AS company_name,
               a.status, a.applied_at
        FROM applications a
        JOIN job_postings jp ON jp.posting_id = a.posting_id
        JOIN companies c ON c.company_id = jp.company_id
        WHERE a.user_id = "#,
    );
    builder.push_bind(query.user_id);

    if let Some(status) = &query.status {
        builder.push(" AND a.status = ").push_bind(status.clone());
    }

    builder.push(format!(
        " ORDER BY a.applied_at {0}, a.application_id {0}",
        query.order.as_sql()
    ));
    builder
        .push(" LIMIT ")
        .push_bind(query.page.limit())
        .push(" OFFSET ")
        .push_bind(query.page.offset());

    builder
}

#[derive(Clone)]
pub struct PostgresApplicationRepository {
    session: DbSession,
}

impl PostgresApplicationRepository {
    pub fn new(session: DbSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl ApplicationRepository for PostgresApplicationRepository {
    #[tracing::instrument(skip(self))]
    async fn exists(&self, user_id: i64, posting_id: i64) -> Result<bool, anyhow::Error> {
        let mut conn = self.session.lock().await;
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM applications WHERE user_id = $1 AND posting_id = $2)",
        )
        .bind(user_id)
        .bind(posting_id)
        .fetch_one(&mut **conn)
        .await
        .map_err(|e| conn.note_failure(e))?;

        Ok(exists)
    }

    #[tracing::instrument(skip(self))]
    async fn resume_owner(&self, resume_id: i64) -> Result<Option<i64>, anyhow::Error> {
        let mut conn = self.session.lock().await;
        let owner =
            sqlx::query_scalar::<_, i64>("SELECT user_id FROM resumes WHERE resume_id = $1")
                .bind(resume_id)
                .fetch_optional(&mut **conn)
                .await
                .map_err(|e| conn.note_failure(e))?;

        Ok(owner)
    }

    #[tracing::instrument(skip(self, application), fields(user_id = application.user_id, posting_id = application.posting_id))]
    async fn create(&self, application: NewApplication) -> Result<i64, anyhow::Error> {
        let mut conn = self.session.lock().await;
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO applications (user_id, posting_id, resume_id, cover_letter, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING application_id
            "#,
        )
        .bind(application.user_id)
        .bind(application.posting_id)
        .bind(application.resume_id)
        .bind(application.cover_letter)
        .fetch_one(&mut **conn)
        .await
        .map_err(|e| conn.note_failure(e))?;

        Ok(id)
    }

    #[tracing::instrument(skip(self, query), fields(user_id = query.user_id))]
    async fn list(
        &self,
        query: &ApplicationQuery,
    ) -> Result<Vec<ApplicationSummary>, anyhow::Error> {
        let mut builder = build_list_query(query);

        let mut conn = self.session.lock().await;
        let applications = builder
            .build_query_as::<ApplicationSummary>()
            .fetch_all(&mut **conn)
            .await
            .map_err(|e| conn.note_failure(e))?;

        Ok(applications)
    }

    #[tracing::instrument(skip(self))]
    async fn find_owner(&self, application_id: i64) -> Result<Option<i64>, anyhow::Error> {
        let mut conn = self.session.lock().await;
        let owner = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM applications WHERE application_id = $1",
        )
        .bind(application_id)
        .fetch_optional(&mut **conn)
        .await
        .map_err(|e| conn.note_failure(e))?;

        Ok(owner)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, application_id: i64) -> Result<bool, anyhow::Error> {
        let mut conn = self.session.lock().await;
        let result = sqlx::query("DELETE FROM applications WHERE application_id = $1")
            .bind(application_id)
            .execute(&mut **conn)
            .await
            .map_err(|e| conn.note_failure(e))?;

        Ok(result.rows_affected() > 0)
    }
}
