use crate::domain::users::{NewUser, ProfileUpdate, User, UserRepository};
use crate::infrastructure::db::DbSession;
use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

const USER_COLUMNS: &str = "user_id AS id, email, password_hash, name, phone, birth_date, \
                            status, last_login, created_at";

#[derive(Clone)]
pub struct PostgresUserRepository {
    session: DbSession,
}

impl PostgresUserRepository {
    pub fn new(session: DbSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(skip(self, new_user), fields(email = %new_user.email))]
    async fn create(&self, new_user: NewUser) -> Result<User, anyhow::Error> {
        let mut conn = self.session.lock().await;
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, name, phone, birth_date, status)
            VALUES ($1, $2, $3, $4, $5, 'active')
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new_user.email)
        .bind(new_user.password_hash)
        .bind(new_user.name)
        .bind(new_user.phone)
        .bind(new_user.birth_date)
        .fetch_one(&mut **conn)
        .await
        .map_err(|e| conn.note_failure(e))?;

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, anyhow::Error> {
        let mut conn = self.session.lock().await;
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut **conn)
        .await
        .map_err(|e| conn.note_failure(e))?;

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        let mut conn = self.session.lock().await;
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&mut **conn)
        .await
        .map_err(|e| conn.note_failure(e))?;

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn record_login(&self, id: i64) -> Result<(), anyhow::Error> {
        let mut conn = self.session.lock().await;
        sqlx::query("UPDATE users SET last_login = NOW() WHERE user_id = $1")
            .bind(id)
            .execute(&mut **conn)
            .await
            .map_err(|e| conn.note_failure(e))?;

        Ok(())
    }

    #[tracing::instrument(skip(self, update))]
    async fn update_profile(&self, id: i64, update: ProfileUpdate) -> Result<bool, anyhow::Error> {
        if update.is_empty() {
            return Ok(false);
        }

        let mut query = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        let mut fields = query.separated(", ");
        if let Some(name) = update.name {
            fields.push("name = ").push_bind_unseparated(name);
        }
        if let Some(phone) = update.phone {
            fields.push("phone = ").push_bind_unseparated(phone);
        }
        if let Some(birth_date) = update.birth_date {
            fields.push("birth_date = ").push_bind_unseparated(birth_date);
        }
        if let Some(password_hash) = update.password_hash {
            fields
                .push("password_hash = ")
                .push_bind_unseparated(password_hash);
        }
        query.push(" WHERE user_id = ").push_bind(id);

        let mut conn = self.session.lock().await;
        let result = query
            .build()
            .execute(&mut **conn)
            .await
            .map_err(|e| conn.note_failure(e))?;

        Ok(result.rows_affected() > 0)
    }
}
