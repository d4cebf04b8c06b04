//! PostgreSQL backend: network pool, pgvector similarity search.

pub mod adapter;
pub mod manager;

pub use adapter::{PostgresAdapter, PostgresBackend};
pub use manager::PostgresConnectionManager;
