//! SQLite connection lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{AdapterError, Result};

const MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The path that selects a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

/// Owns the SQLite pool and its shutdown state.
pub struct SqliteConnectionManager {
    pool: SqlitePool,
    shutting_down: AtomicBool,
}

impl SqliteConnectionManager {
    /// Open (creating if missing) the database at `path`, or an in-memory
    /// database for [`MEMORY_PATH`].
    ///
    /// An in-memory database exists per connection, so its pool is pinned
    /// to a single connection that never expires; otherwise each checkout
    /// would see a fresh empty database.
    pub async fn open(path: &str) -> Result<Self> {
        let pool = if path == MEMORY_PATH {
            let options = SqliteConnectOptions::new()
                .in_memory(true)
                .foreign_keys(true);
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(BUSY_TIMEOUT)
                .foreign_keys(true);
            SqlitePoolOptions::new()
                .max_connections(MAX_CONNECTIONS)
                .connect_with(options)
                .await?
        };
        info!(path, "opened sqlite database");
        Ok(Self {
            pool,
            shutting_down: AtomicBool::new(false),
        })
    }

    /// The live pool. Fails once shutdown has begun.
    pub fn pool(&self) -> Result<&SqlitePool> {
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
            debug!("sqlite pool already closing");
            return Ok(());
        }
        info!("closing sqlite pool");
        self.pool.close().await;
        Ok(())
    }
}
