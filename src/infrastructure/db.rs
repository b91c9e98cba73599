use crate::infrastructure::config::AppConfig;
use crate::infrastructure::pool::{
    ConnectionManager, ConnectionPool, PoolConfig, PoolError, PooledConnection,
};
use async_trait::async_trait;
use axum::http::Extensions;
use sqlx::Connection;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

pub type DbPool = ConnectionPool<PgConnectionManager>;
pub type DbConnection = PooledConnection<PgConnectionManager>;

/// Opens and recycles Postgres sessions for the pool
pub struct PgConnectionManager {
    options: PgConnectOptions,
}

impl PgConnectionManager {
    pub fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        Ok(Self {
            options: PgConnectOptions::from_str(database_url)?,
        })
    }
}

#[async_trait]
impl ConnectionManager for PgConnectionManager {
    type Connection = PgConnection;

    async fn connect(&self) -> anyhow::Result<PgConnection> {
        Ok(PgConnection::connect_with(&self.options).await?)
    }

    async fn reset(&self, conn: &mut PgConnection) -> anyhow::Result<()> {
        // Outside a transaction this is only a server-side warning.
        sqlx::Executor::execute(&mut *conn, sqlx::raw_sql("ROLLBACK")).await?;
        conn.clear_cached_statements().await?;
        sqlx::Executor::execute(&mut *conn, sqlx::raw_sql("DISCARD ALL")).await?;
        Ok(())
    }
}

pub async fn create_pool(config: &AppConfig) -> anyhow::Result<DbPool> {
    let manager = PgConnectionManager::new(&config.database_url)?;
    create_pool_with(manager, config.pool.clone()).await
}

pub async fn create_pool_with(
    manager: PgConnectionManager,
    config: PoolConfig,
) -> anyhow::Result<DbPool> {
    ConnectionPool::new(manager, config).await
}

impl PooledConnection<PgConnectionManager> {
    /// Flag the connection for disposal when `err` means the session itself
    /// is unusable, then hand the error back.
    pub fn note_failure(&mut self, err: sqlx::Error) -> sqlx::Error {
        if matches!(
            err,
            sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::Protocol(_)
                | sqlx::Error::WorkerCrashed
        ) {
            tracing::warn!(error = %err, "connection failed mid-request");
            self.mark_broken();
        }
        err
    }
}

/// The pooled connection owned by one request.
///
/// Every stage of a request that touches the database shares the same
/// session; the connection goes back to the pool when the last clone drops.
#[derive(Clone)]
pub struct DbSession {
    conn: Arc<Mutex<DbConnection>>,
}

impl DbSession {
    pub async fn acquire(pool: &DbPool) -> Result<Self, PoolError> {
        let conn = pool.acquire().await?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Reuse the session already bound to this request, or check one out and
    /// bind it.
    pub async fn for_request(
        extensions: &mut Extensions,
        pool: &DbPool,
    ) -> Result<Self, PoolError> {
        if let Some(session) = extensions.get::<DbSession>() {
            return Ok(session.clone());
        }

        let session = Self::acquire(pool).await?;
        extensions.insert(session.clone());
        Ok(session)
    }

    /// Exclusive access to the connection; statements run one at a time
    pub async fn lock(&self) -> MutexGuard<'_, DbConnection> {
        self.conn.lock().await
    }
}
