//! Pluggable persistence for agent runtimes.
//!
//! One adapter contract, [`DatabaseAdapter`], over two storage backends:
//! a network PostgreSQL server (with pgvector similarity search) and an
//! embedded SQLite database for local and test deployments. The runtime
//! holds an `Arc<dyn DatabaseAdapter>` and never sees which backend is
//! behind it.
//!
//! ```no_run
//! use std::sync::Arc;
//! use elizaos_adapters::{DatabaseAdapter, SqliteAdapter};
//! use uuid::Uuid;
//!
//! # async fn run() -> elizaos_adapters::Result<()> {
//! let adapter = SqliteAdapter::open("agent.db", Uuid::new_v4()).await?;
//! adapter.init().await?;
//! adapter.run_migrations().await?;
//! let adapter: Arc<dyn DatabaseAdapter> = Arc::new(adapter);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod base;
pub mod error;
pub mod migration;
pub mod postgres;
pub mod retry;
pub mod schema;
pub mod shutdown;
pub mod sqlite;
pub mod types;

pub use backend::{Backend, DatabaseConnection};
pub use base::{BaseAdapter, DatabaseAdapter};
pub use error::{AdapterError, Result};
pub use postgres::{PostgresAdapter, PostgresBackend};
pub use retry::RetryPolicy;
pub use schema::EmbeddingDimension;
pub use sqlite::{SqliteAdapter, SqliteBackend};
pub use types::{
    Agent, ChannelType, CreateRelationshipParams, Entity, GetLogsParams, GetMemoriesParams,
    GetTasksParams, LogEntry, LogParams, Memory, Participant, Relationship, Room,
    SearchMemoriesParams, Task, World,
};
