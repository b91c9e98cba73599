use crate::domain::jobs::{
    JobDetail, JobRepository, JobSearch, JobStatus, JobSummary, JobUpdate, Location, NewJob,
    RelatedJob,
};
use crate::infrastructure::db::DbSession;
use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::postgres::PgConnection;
use sqlx::{Connection, Postgres, QueryBuilder};

const AGGREGATED_TAGS: &str = r#"
    COALESCE(array_agg(DISTINCT ts.name::text) FILTER (WHERE ts.name IS NOT NULL), '{}') AS tech_stacks,
    COALESCE(array_agg(DISTINCT jc.name::text) FILTER (WHERE jc.name IS NOT NULL), '{}') AS job_categories
"#;

const POSTING_JOINS: &str = r#"
    FROM job_postings jp
    JOIN companies c ON c.company_id = jp.company_id
    LEFT JOIN locations l ON l.location_id = jp.location_id
    LEFT JOIN posting_tech_stacks pts ON pts.posting_id = jp.posting_id
    LEFT JOIN tech_stacks ts ON ts.stack_id = pts.stack_id
    LEFT JOIN posting_categories pc ON pc.posting_id = jp.posting_id
    LEFT JOIN job_categories jc ON jc.category_id = pc.category_id
"#;

fn contains(value: &str) -> String {
    format!("%{}%", value)
}

/// Build the listing query for active postings.
///
/// Every user value is bound; only the whitelisted sort column and direction
/// are spliced into the SQL text. Tag filters are `EXISTS` subqueries so the
/// aggregated tag arrays still list every tag of a matching posting.
pub fn build_search_query(search: &JobSearch) -> QueryBuilder<'static, Postgres> {
    let filters = &search.filters;
    let mut query = QueryBuilder::<Postgres>::new(
        r#"
    SELECT
        jp.posting_id,
        c.name AS company_name,
        jp.title,
        jp.job_description,
        jp.experience_level,
        jp.education_level,
        jp.employment_type,
        jp.salary_info,
        jp.location_id,
        CASE WHEN l.location_id IS NULL THEN NULL
             ELSE CONCAT_WS(' ', l.city, l.district) END AS location,
        jp.deadline_date,
        jp.view_count,
        jp.created_at,"#,
    );
    query.push(AGGREGATED_TAGS);
    query.push(POSTING_JOINS);
    query.push(" WHERE jp.status = 'active'");

    if let Some(keyword) = &filters.keyword {
        query
            .push(" AND (jp.title ILIKE ")
            .push_bind(contains(keyword))
            .push(" OR jp.job_description ILIKE ")
            .push_bind(contains(keyword))
            .push(")");
    }
    if let Some(company) = &filters.company {
        query.push(" AND c.name ILIKE ").push_bind(contains(company));
    }
    if let Some(employment_type) = &filters.employment_type {
        query
            .push(" AND jp.employment_type = ")
            .push_bind(employment_type.clone());
    }
    if let Some(position) = &filters.position {
        query.push(" AND jp.title ILIKE ").push_bind(contains(position));
    }
    if let Some(location_id) = filters.location_id {
        query.push(" AND jp.location_id = ").push_bind(location_id);
    }
    if let Some(salary_info) = &filters.salary_info {
        query
            .push(" AND jp.salary_info ILIKE ")
            .push_bind(contains(salary_info));
    }
    if let Some(experience_level) = &filters.experience_level {
        query
            .push(" AND jp.experience_level = ")
            .push_bind(experience_level.clone());
    }
    if !filters.tech_stacks.is_empty() {
        query
            .push(
                " AND EXISTS (SELECT 1 FROM posting_tech_stacks fpts \
                 JOIN tech_stacks fts ON fts.stack_id = fpts.stack_id \
                 WHERE fpts.posting_id = jp.posting_id AND fts.name = ANY(",
            )
            .push_bind(filters.tech_stacks.clone())
            .push("))");
    }
    if !filters.job_categories.is_empty() {
        query
            .push(
                " AND EXISTS (SELECT 1 FROM posting_categories fpc \
                 JOIN job_categories fjc ON fjc.category_id = fpc.category_id \
                 WHERE fpc.posting_id = jp.posting_id AND fjc.name = ANY(",
            )
            .push_bind(filters.job_categories.clone())
            .push("))");
    }

    let direction = search.sort_order.as_sql();
    query.push(" GROUP BY jp.posting_id, c.company_id, l.location_id");
    query.push(format!(
        " ORDER BY {} {}, jp.posting_id {}",
        search.sort_field.column(),
        direction,
        direction
    ));
    query
        .push(" LIMIT ")
        .push_bind(search.page.limit())
        .push(" OFFSET ")
        .push_bind(search.page.offset());

    query
}

async fn upsert_location(conn: &mut PgConnection, location: &Location) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO locations (city, district)
        VALUES ($1, $2)
        ON CONFLICT (city, COALESCE(district, '')) DO UPDATE SET city = EXCLUDED.city
        RETURNING location_id
        "#,
    )
    .bind(&location.city)
    .bind(&location.district)
    .fetch_one(conn)
    .await
}

async fn attach_tech_stacks(
    conn: &mut PgConnection,
    posting_id: i64,
    names: &[String],
) -> Result<(), sqlx::Error> {
    for name in names {
        let stack_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO tech_stacks (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING stack_id
            "#,
        )
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            "INSERT INTO posting_tech_stacks (posting_id, stack_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(posting_id)
        .bind(stack_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn attach_categories(
    conn: &mut PgConnection,
    posting_id: i64,
    names: &[String],
) -> Result<(), sqlx::Error> {
    for name in names {
        let category_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO job_categories (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING category_id
            "#,
        )
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            "INSERT INTO posting_categories (posting_id, category_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(posting_id)
        .bind(category_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn insert_job(conn: &mut PgConnection, job: NewJob) -> Result<i64, sqlx::Error> {
    let mut tx = conn.begin().await?;

    let location_id = match &job.location {
        Some(location) => Some(upsert_location(&mut tx, location).await?),
        None => None,
    };

    let posting_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO job_postings (
            company_id, title, job_description, experience_level, education_level,
            employment_type, salary_info, location_id, deadline_date, status, view_count
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'active', 0)
        RETURNING posting_id
        "#,
    )
    .bind(job.company_id)
    .bind(&job.title)
    .bind(&job.job_description)
    .bind(&job.experience_level)
    .bind(&job.education_level)
    .bind(&job.employment_type)
    .bind(&job.salary_info)
    .bind(location_id)
    .bind(job.deadline_date)
    .fetch_one(&mut *tx)
    .await?;

    attach_tech_stacks(&mut tx, posting_id, &job.tech_stacks).await?;
    attach_categories(&mut tx, posting_id, &job.job_categories).await?;

    tx.commit().await?;
    Ok(posting_id)
}

async fn apply_update(
    conn: &mut PgConnection,
    id: i64,
    update: JobUpdate,
) -> Result<bool, sqlx::Error> {
    let mut tx = conn.begin().await?;

    let found = sqlx::query_scalar::<_, i64>(
        "SELECT posting_id FROM job_postings WHERE posting_id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;
    if found.is_none() {
        return Ok(false);
    }

    let location_id = match &update.location {
        Some(location) => Some(upsert_location(&mut tx, location).await?),
        None => None,
    };

    let mut query = QueryBuilder::<Postgres>::new("UPDATE job_postings SET ");
    let mut fields = query.separated(", ");
    let mut changed = false;
    macro_rules! set_column {
        ($column:literal, $value:expr) => {
            if let Some(value) = $value {
                fields
                    .push(concat!($column, " = "))
                    .push_bind_unseparated(value);
                changed = true;
            }
        };
    }
    set_column!("title", update.title);
    set_column!("job_description", update.job_description);
    set_column!("experience_level", update.experience_level);
    set_column!("education_level", update.education_level);
    set_column!("employment_type", update.employment_type);
    set_column!("salary_info", update.salary_info);
    set_column!("deadline_date", update.deadline_date);
    set_column!("status", update.status.map(|s| s.as_str()));
    set_column!("location_id", location_id);

    if changed {
        query.push(" WHERE posting_id = ").push_bind(id);
        query.build().execute(&mut *tx).await?;
    }

    if let Some(tech_stacks) = &update.tech_stacks {
        sqlx::query("DELETE FROM posting_tech_stacks WHERE posting_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        attach_tech_stacks(&mut tx, id, tech_stacks).await?;
    }
    if let Some(job_categories) = &update.job_categories {
        sqlx::query("DELETE FROM posting_categories WHERE posting_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        attach_categories(&mut tx, id, job_categories).await?;
    }

    tx.commit().await?;
    Ok(true)
}

#[derive(Clone)]
pub struct PostgresJobRepository {
    session: DbSession,
}

impl PostgresJobRepository {
    pub fn new(session: DbSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl JobRepository for PostgresJobRepository {
    #[tracing::instrument(skip(self, search))]
    async fn search(&self, search: &JobSearch) -> Result<Vec<JobSummary>, anyhow::Error> {
        let mut query = build_search_query(search);

        let mut conn = self.session.lock().await;
        let jobs = query
            .build_query_as::<JobSummary>()
            .fetch_all(&mut **conn)
            .await
            .map_err(|e| conn.note_failure(e))?;

        Ok(jobs)
    }

    #[tracing::instrument(skip(self))]
    async fn find_detail(&self, id: i64) -> Result<Option<JobDetail>, anyhow::Error> {
        let sql = format!(
            r#"
            SELECT
                jp.posting_id,
                jp.company_id,
                c.name AS company_name,
                jp.title,
                jp.job_description,
                jp.experience_level,
                jp.education_level,
                jp.employment_type,
                jp.salary_info,
                jp.location_id,
                l.city,
                l.district,
                jp.deadline_date,
                jp.status,
                jp.view_count,
                jp.created_at,
                {AGGREGATED_TAGS}
            {POSTING_JOINS}
            WHERE jp.posting_id = $1 AND jp.status <> 'deleted'
            GROUP BY jp.posting_id, c.company_id, l.location_id
            "#
        );

        let mut conn = self.session.lock().await;
        let job = sqlx::query_as::<_, JobDetail>(&sql)
            .bind(id)
            .fetch_optional(&mut **conn)
            .await
            .map_err(|e| conn.note_failure(e))?;

        Ok(job)
    }

    #[tracing::instrument(skip(self))]
    async fn increment_view_count(&self, id: i64) -> Result<(), anyhow::Error> {
        let mut conn = self.session.lock().await;
        sqlx::query(
            "UPDATE job_postings SET view_count = view_count + 1 \
             WHERE posting_id = $1 AND status <> 'deleted'",
        )
        .bind(id)
        .execute(&mut **conn)
        .await
        .map_err(|e| conn.note_failure(e))?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn find_related(
        &self,
        id: i64,
        company_id: i64,
        limit: i64,
    ) -> Result<Vec<RelatedJob>, anyhow::Error> {
        let mut conn = self.session.lock().await;
        let related = sqlx::query_as::<_, RelatedJob>(
            r#"
            SELECT jp.posting_id, jp.title, c.name AS company_name
            FROM job_postings jp
            JOIN companies c ON c.company_id = jp.company_id
            WHERE jp.status = 'active'
              AND jp.posting_id <> $1
              AND (
                  jp.company_id = $2
                  OR EXISTS (
                      SELECT 1
                      FROM posting_tech_stacks mine
                      JOIN posting_tech_stacks theirs ON theirs.stack_id = mine.stack_id
                      WHERE mine.posting_id = $1 AND theirs.posting_id = jp.posting_id
                  )
              )
            ORDER BY RANDOM()
            LIMIT $3
            "#,
        )
        .bind(id)
        .bind(company_id)
        .bind(limit)
        .fetch_all(&mut **conn)
        .await
        .map_err(|e| conn.note_failure(e))?;

        Ok(related)
    }

    #[tracing::instrument(skip(self))]
    async fn company_exists(&self, company_id: i64) -> Result<bool, anyhow::Error> {
        let mut conn = self.session.lock().await;
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM companies WHERE company_id = $1)",
        )
        .bind(company_id)
        .fetch_one(&mut **conn)
        .await
        .map_err(|e| conn.note_failure(e))?;

        Ok(exists)
    }

    #[tracing::instrument(skip(self, job), fields(company_id = job.company_id))]
    async fn create(&self, job: NewJob) -> Result<i64, anyhow::Error> {
        let mut conn = self.session.lock().await;
        let posting_id = insert_job(&mut conn, job)
            .await
            .map_err(|e| conn.note_failure(e))?;

        Ok(posting_id)
    }

    #[tracing::instrument(skip(self, update))]
    async fn update(&self, id: i64, update: JobUpdate) -> Result<bool, anyhow::Error> {
        let mut conn = self.session.lock().await;
        let found = apply_update(&mut conn, id, update)
            .await
            .map_err(|e| conn.note_failure(e))?;

        Ok(found)
    }

    #[tracing::instrument(skip(self))]
    async fn find_status(&self, id: i64) -> Result<Option<JobStatus>, anyhow::Error> {
        let mut conn = self.session.lock().await;
        let status = sqlx::query_scalar::<_, String>(
            "SELECT status FROM job_postings WHERE posting_id = $1",
        )
        .bind(id)
        .fetch_optional(&mut **conn)
        .await
        .map_err(|e| conn.note_failure(e))?;

        status
            .map(|s| s.parse::<JobStatus>().map_err(|e| anyhow!(e)))
            .transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn mark_deleted(&self, id: i64) -> Result<(), anyhow::Error> {
        let mut conn = self.session.lock().await;
        sqlx::query("UPDATE job_postings SET status = 'deleted' WHERE posting_id = $1")
            .bind(id)
            .execute(&mut **conn)
            .await
            .map_err(|e| conn.note_failure(e))?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn is_open(&self, id: i64) -> Result<bool, anyhow::Error> {
        let mut conn = self.session.lock().await;
        let open = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM job_postings WHERE posting_id = $1 AND status <> 'deleted')",
        )
        .bind(id)
        .fetch_one(&mut **conn)
        .await
        .map_err(|e| conn.note_failure(e))?;

        Ok(open)
    }
}
