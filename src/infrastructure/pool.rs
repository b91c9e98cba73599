use anyhow::Context;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Errors surfaced by [`ConnectionPool::acquire`]
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("no database connection available after {attempts} attempts")]
    ConnectionUnavailable { attempts: u32 },
    #[error("connection pool is closed")]
    Closed,
}

/// Knows how to open, clean and inspect one kind of connection.
///
/// The pool never talks to a database directly; everything backend specific
/// lives behind this trait so the pool can be exercised with fake connections.
#[async_trait]
pub trait ConnectionManager: Send + Sync + 'static {
    type Connection: Send + 'static;

    /// Open a new live connection
    async fn connect(&self) -> anyhow::Result<Self::Connection>;

    /// Bring a previously used connection back to a clean session state
    async fn reset(&self, conn: &mut Self::Connection) -> anyhow::Result<()>;

    /// Cheap, synchronous check run when a connection is handed back
    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of connections opened at startup, and the checkout limit
    pub max_size: usize,
    /// How many times `acquire` tries before giving up
    pub acquire_attempts: u32,
    /// Wait per attempt, and the pause after a failed connect
    pub retry_delay: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 10,
            acquire_attempts: 3,
            retry_delay: Duration::from_millis(100),
        }
    }
}

/// Snapshot of pool occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
pub struct PoolStatus {
    pub size: usize,
    pub idle: usize,
    pub in_use: usize,
}

struct IdleConnection<C> {
    conn: C,
    dirty: bool,
}

struct Shared<M: ConnectionManager> {
    manager: M,
    config: PoolConfig,
    slots: Arc<Semaphore>,
    idle: Mutex<VecDeque<IdleConnection<M::Connection>>>,
}

impl<M: ConnectionManager> Shared<M> {
    fn idle(&self) -> MutexGuard<'_, VecDeque<IdleConnection<M::Connection>>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Bounded pool of pre-established connections.
///
/// A semaphore with `max_size` permits guards checkouts, so a connection is
/// only ever held by the one [`PooledConnection`] that owns its permit.
pub struct ConnectionPool<M: ConnectionManager> {
    shared: Arc<Shared<M>>,
}

impl<M: ConnectionManager> Clone for ConnectionPool<M> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<M: ConnectionManager> ConnectionPool<M> {
    /// Open every connection up front. Startup fails if any of them cannot be
    /// established.
    pub async fn new(manager: M, config: PoolConfig) -> anyhow::Result<Self> {
        anyhow::ensure!(config.max_size > 0, "pool size must be at least 1");
        anyhow::ensure!(
            config.acquire_attempts > 0,
            "acquire attempts must be at least 1"
        );

        let mut idle = VecDeque::with_capacity(config.max_size);
        for n in 0..config.max_size {
            let conn = manager
                .connect()
                .await
                .with_context(|| format!("failed to open pooled connection {}", n + 1))?;
            idle.push_back(IdleConnection { conn, dirty: false });
        }

        tracing::info!(
            size = config.max_size,
            attempts = config.acquire_attempts,
            retry_delay_ms = config.retry_delay.as_millis() as u64,
            "connection pool established"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                manager,
                slots: Arc::new(Semaphore::new(config.max_size)),
                idle: Mutex::new(idle),
                config,
            }),
        })
    }

    /// Check a connection out for the caller.
    ///
    /// Each attempt waits up to `retry_delay` for a free slot. A slot whose
    /// connection cannot be reset or reopened counts as a failed attempt and
    /// is followed by a `retry_delay` pause.
    pub async fn acquire(&self) -> Result<PooledConnection<M>, PoolError> {
        let attempts = self.shared.config.acquire_attempts;
        let delay = self.shared.config.retry_delay;

        for attempt in 1..=attempts {
            let permit =
                match tokio::time::timeout(delay, Arc::clone(&self.shared.slots).acquire_owned())
                    .await
                {
                    Ok(Ok(permit)) => permit,
                    Ok(Err(_)) => return Err(PoolError::Closed),
                    Err(_) => {
                        tracing::debug!(attempt, "connection pool exhausted");
                        continue;
                    }
                };

            match self.checkout().await {
                Ok(conn) => {
                    return Ok(PooledConnection {
                        shared: Arc::clone(&self.shared),
                        conn: Some(conn),
                        permit: Some(permit),
                        broken: false,
                    });
                }
                Err(e) => {
                    drop(permit);
                    tracing::warn!(attempt, error = %e, "failed to prepare pooled connection");
                    if attempt < attempts {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        tracing::error!(attempts, "giving up on connection acquisition");
        Err(PoolError::ConnectionUnavailable { attempts })
    }

    /// Take an idle connection (resetting it if it was used before), or open
    /// a replacement for a slot whose connection was discarded.
    async fn checkout(&self) -> anyhow::Result<M::Connection> {
        let next = self.shared.idle().pop_front();

        match next {
            Some(IdleConnection { conn, dirty: false }) => Ok(conn),
            Some(IdleConnection {
                mut conn,
                dirty: true,
            }) => match self.shared.manager.reset(&mut conn).await {
                Ok(()) => Ok(conn),
                Err(e) => {
                    tracing::warn!(error = %e, "discarding connection that failed to reset");
                    drop(conn);
                    self.shared.manager.connect().await
                }
            },
            None => self.shared.manager.connect().await,
        }
    }

    pub fn status(&self) -> PoolStatus {
        let size = self.shared.config.max_size;
        PoolStatus {
            size,
            idle: self.shared.idle().len(),
            in_use: size - self.shared.slots.available_permits(),
        }
    }

    /// Refuse further checkouts and drop idle connections. Connections that
    /// are checked out are dropped when their guards release them.
    pub fn close(&self) {
        self.shared.slots.close();
        self.shared.idle().clear();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.slots.is_closed()
    }
}

/// A connection checked out of a [`ConnectionPool`].
///
/// Dropping the guard releases it. Releasing is idempotent.
pub struct PooledConnection<M: ConnectionManager> {
    shared: Arc<Shared<M>>,
    conn: Option<M::Connection>,
    permit: Option<OwnedSemaphorePermit>,
    broken: bool,
}

impl<M: ConnectionManager> PooledConnection<M> {
    /// Hand the connection back to the pool. A broken connection is dropped
    /// and its slot reopens a fresh one on the next checkout.
    pub fn release(&mut self) {
        let Some(mut conn) = self.conn.take() else {
            return;
        };

        if self.broken || self.shared.manager.has_broken(&mut conn) {
            tracing::warn!("discarding broken connection");
            drop(conn);
        } else if !self.shared.slots.is_closed() {
            self.shared
                .idle()
                .push_back(IdleConnection { conn, dirty: true });
        }

        // The slot only frees up once the connection is back in the queue.
        self.permit.take();
    }

    /// Do not return this connection to the pool
    pub fn mark_broken(&mut self) {
        self.broken = true;
    }

    pub fn is_released(&self) -> bool {
        self.conn.is_none()
    }
}

impl<M: ConnectionManager> Deref for PooledConnection<M> {
    type Target = M::Connection;

    fn deref(&self) -> &Self::Target {
        self.conn
            .as_ref()
            .expect("pooled connection used after release")
    }
}

impl<M: ConnectionManager> DerefMut for PooledConnection<M> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn
            .as_mut()
            .expect("pooled connection used after release")
    }
}

impl<M: ConnectionManager> Drop for PooledConnection<M> {
    fn drop(&mut self) {
        self.release();
    }
}
