use crate::domain::bookmarks::{BookmarkRepository, BookmarkedJob};
use crate::infrastructure::db::DbSession;
use crate::shared::pagination::{PageRequest, SortOrder};
use async_trait::async_trait;

#[derive(Clone)]
pub struct PostgresBookmarkRepository {
    session: DbSession,
}

impl PostgresBookmarkRepository {
    pub fn new(session: DbSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl BookmarkRepository for PostgresBookmarkRepository {
    #[tracing::instrument(skip(self))]
    async fn find(&self, user_id: i64, posting_id: i64) -> Result<Option<i64>, anyhow::Error> {
        let mut conn = self.session.lock().await;
        let id = sqlx::query_scalar::<_, i64>(
            "SELECT bookmark_id FROM bookmarks WHERE user_id = $1 AND posting_id = $2",
        )
        .bind(user_id)
        .bind(posting_id)
        .fetch_optional(&mut **conn)
        .await
        .map_err(|e| conn.note_failure(e))?;

        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    async fn add(&self, user_id: i64, posting_id: i64) -> Result<i64, anyhow::Error> {
        let mut conn = self.session.lock().await;
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO bookmarks (user_id, posting_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, posting_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING bookmark_id
            "#,
        )
        .bind(user_id)
        .bind(posting_id)
        .fetch_one(&mut **conn)
        .await
        .map_err(|e| conn.note_failure(e))?;

        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    async fn remove(&self, bookmark_id: i64) -> Result<bool, anyhow::Error> {
        let mut conn = self.session.lock().await;
        let result = sqlx::query("DELETE FROM bookmarks WHERE bookmark_id = $1")
            .bind(bookmark_id)
            .execute(&mut **conn)
            .await
            .map_err(|e| conn.note_failure(e))?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn list(
        &self,
        user_id: i64,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<Vec<BookmarkedJob>, anyhow::Error> {
        // Direction comes from a closed enum, never from the request text.
        let sql = format!(
            r#"
            SELECT
                b.bookmark_id,
                b.posting_id,
                jp.title,
                jp.job_description,
                jp.experience_level,
                jp.education_level,
                jp.employment_type,
                jp.salary_info,
                CASE WHEN l.location_id IS NULL THEN NULL
                     ELSE CONCAT_WS(' ', l.city, l.district) END AS location,
                jp.deadline_date,
                jp.view_count,
                c.name AS company_name,
                COALESCE(array_agg(DISTINCT ts.name::text) FILTER (WHERE ts.name IS NOT NULL), '{{}}') AS tech_stacks,
                COALESCE(array_agg(DISTINCT jc.name::text) FILTER (WHERE jc.name IS NOT NULL), '{{}}') AS job_categories,
                b.created_at
            FROM bookmarks b
            JOIN job_postings jp ON jp.posting_id = b.posting_id
            JOIN companies c ON c.company_id = jp.company_id
            LEFT JOIN locations l ON l.location_id = jp.location_id
            LEFT JOIN posting_tech_stacks pts ON pts.posting_id = jp.posting_id
            LEFT JOIN tech_stacks ts ON ts.stack_id = pts.stack_id
            LEFT JOIN posting_categories pc ON pc.posting_id = jp.posting_id
            LEFT JOIN job_categories jc ON jc.category_id = pc.category_id
            WHERE b.user_id = $1
            GROUP BY b.bookmark_id, jp.posting_id, c.company_id, l.location_id
            ORDER BY b.created_at {order}, b.bookmark_id {order}
            LIMIT $2 OFFSET $3
            "#,
            order = order.as_sql()
        );

        let mut conn = self.session.lock().await;
        let bookmarks = sqlx::query_as::<_, BookmarkedJob>(&sql)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut **conn)
            .await
            .map_err(|e| conn.note_failure(e))?;

        Ok(bookmarks)
    }
}
