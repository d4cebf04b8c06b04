//! SQLite backend: embedded storage for local and test deployments.

pub mod adapter;
pub mod manager;

pub use adapter::{SqliteAdapter, SqliteBackend};
pub use manager::SqliteConnectionManager;
