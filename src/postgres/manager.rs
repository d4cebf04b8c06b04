//! PostgreSQL connection lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::error::{AdapterError, Result};
use crate::retry::RetryPolicy;

const MAX_CONNECTIONS: u32 = 10;
const MIN_CONNECTIONS: u32 = 1;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Owns the PostgreSQL pool and its shutdown state.
///
/// Once [`close`](Self::close) is called, handing out the pool fails with
/// [`AdapterError::ShuttingDown`]; operations already holding a connection
/// drain normally because `sqlx` closes the pool gracefully.
pub struct PostgresConnectionManager {
    pool: PgPool,
    shutting_down: AtomicBool,
}

impl PostgresConnectionManager {
    /// Connect and verify the database answers. The initial connection is
    /// retried under `retry` since a database coming up alongside the
    /// agent is the common deployment.
    pub async fn connect(url: &str, retry: &RetryPolicy) -> Result<Self> {
        let pool = retry
            .execute(|| async {
                let pool = PgPoolOptions::new()
                    .max_connections(MAX_CONNECTIONS)
                    .min_connections(MIN_CONNECTIONS)
                    .acquire_timeout(ACQUIRE_TIMEOUT)
                    .connect(url)
                    .await?;
                sqlx::query("SELECT 1").execute(&pool).await?;
                Ok(pool)
            })
            .await?;
        info!("connected to postgres");
        Ok(Self {
            pool,
            shutting_down: AtomicBool::new(false),
        })
    }

    /// The live pool. Fails once shutdown has begun.
    pub fn pool(&self) -> Result<&PgPool> {
        if self.is_shutting_down() {
            return Err(AdapterError::ShuttingDown);
        }
        Ok(&self.pool)
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// Begin graceful shutdown. Idempotent.
    pub async fn close(&self) -> Result<()> {
        if self.shutting_down.swap(true, Ordering::SeqCst) {
            debug!("postgres pool already closing");
            return Ok(());
        }
        info!("closing postgres pool");
        self.pool.close().await;
        Ok(())
    }
}
