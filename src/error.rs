//! Error taxonomy for the adapter layer.
//!
//! Driver-level failures are folded into a small set of classes so callers
//! can tell "retry this" (connection loss) apart from "fix your input"
//! (validation, constraint) without inspecting backend-specific codes.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Classified adapter error.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Failure to establish or maintain the underlying connection.
    /// Transient: retried with backoff by the adapter.
    #[error("connection error: {0}")]
    Connection(String),

    /// Malformed input rejected before it reaches the database.
    #[error("validation error: {0}")]
    Validation(String),

    /// Uniqueness or foreign-key violation.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Operation attempted after graceful shutdown began.
    #[error("adapter is shutting down")]
    ShuttingDown,

    /// Schema migration failure. Fatal at startup.
    #[error("migration error: {0}")]
    Migration(String),

    /// JSON encode/decode failure on a content or metadata blob.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other database error.
    #[error("database error: {0}")]
    Database(String),
}

impl AdapterError {
    /// Convenience constructor for validation failures.
    pub fn validation(msg: impl Into<String>) -> Self {
        AdapterError::Validation(msg.into())
    }

    /// Convenience constructor for migration failures.
    pub fn migration(msg: impl Into<String>) -> Self {
        AdapterError::Migration(msg.into())
    }

    /// Whether the retry wrapper should attempt the operation again.
    /// Only connection-class failures qualify; everything else propagates
    /// to the caller on first occurrence.
    pub fn is_transient(&self) -> bool {
        matches!(self, AdapterError::Connection(_))
    }
}

impl From<sqlx::Error> for AdapterError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        match &err {
            sqlx::Error::Database(db) => match db.kind() {
                ErrorKind::UniqueViolation => AdapterError::Constraint(db.to_string()),
                ErrorKind::ForeignKeyViolation => AdapterError::Constraint(db.to_string()),
                ErrorKind::NotNullViolation => AdapterError::Constraint(db.to_string()),
                ErrorKind::CheckViolation => AdapterError::Constraint(db.to_string()),
                _ => AdapterError::Database(db.to_string()),
            },
            sqlx::Error::PoolClosed => AdapterError::ShuttingDown,
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut => AdapterError::Connection(err.to_string()),
            sqlx::Error::Configuration(_) => AdapterError::Connection(err.to_string()),
            _ => AdapterError::Database(err.to_string()),
        }
    }
}

impl From<uuid::Error> for AdapterError {
    fn from(err: uuid::Error) -> Self {
        AdapterError::Validation(format!("invalid UUID: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_errors_are_transient() {
        let err = AdapterError::Connection("refused".into());
        assert!(err.is_transient());
    }

    #[test]
    fn permanent_classes_are_not_transient() {
        assert!(!AdapterError::Validation("bad".into()).is_transient());
        assert!(!AdapterError::Constraint("dup".into()).is_transient());
        assert!(!AdapterError::ShuttingDown.is_transient());
        assert!(!AdapterError::Migration("down-level".into()).is_transient());
        assert!(!AdapterError::Database("other".into()).is_transient());
    }

    #[test]
    fn pool_closed_maps_to_shutting_down() {
        let err: AdapterError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, AdapterError::ShuttingDown));
    }

    #[test]
    fn io_errors_map_to_connection() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: AdapterError = sqlx::Error::Io(io).into();
        assert!(matches!(err, AdapterError::Connection(_)));
    }
}
