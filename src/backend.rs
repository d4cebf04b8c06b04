//! Backend seam between the base adapter and a concrete driver.
//!
//! The base adapter is written once against [`Backend`]: portable SQL using
//! `?` placeholders, parameters as [`SqlValue`], and result rows normalized
//! to JSON objects keyed by column name. Each backend supplies binding,
//! decoding, vector-serialization quirks, and migration timing.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use sqlx::{PgPool, SqlitePool};
use uuid::Uuid;

use crate::error::{AdapterError, Result};
use crate::schema::embedding::EmbeddingDimension;

/// A result row, normalized to a JSON object keyed by column name.
pub type SqlRow = serde_json::Map<String, Value>;

/// One SQL statement plus its bound parameters.
pub type Statement = (String, Vec<SqlValue>);

/// A parameter value, bound by the backend in its native representation
/// (UUIDs and JSON are native on Postgres, TEXT-encoded on SQLite).
#[derive(Clone, Debug)]
pub enum SqlValue {
    Uuid(Uuid),
    UuidOpt(Option<Uuid>),
    Text(String),
    TextOpt(Option<String>),
    Bool(bool),
    I64(i64),
    F64(f64),
    Json(Value),
    Timestamp(DateTime<Utc>),
    TimestampOpt(Option<DateTime<Utc>>),
    /// Embedding vector; float array on Postgres, LE f32 blob on SQLite.
    Vector(Vec<f32>),
}

/// Strongly-typed handle to an adapter's underlying connection pool.
#[derive(Clone, Debug)]
pub enum DatabaseConnection {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

/// Vector similarity search request, resolved per backend: Postgres runs
/// it in SQL on the active pgvector column, SQLite scans candidate blobs
/// and ranks in process. Rows come back with a `distance` column.
#[derive(Clone, Debug)]
pub struct VectorSearchQuery {
    pub agent_id: Uuid,
    pub table_name: String,
    pub embedding: Vec<f32>,
    pub dimension: EmbeddingDimension,
    pub room_id: Option<Uuid>,
    pub world_id: Option<Uuid>,
    pub entity_id: Option<Uuid>,
    /// Maximum cosine distance.
    pub distance_threshold: f64,
    pub count: i64,
    /// Restrict to memories flagged unique.
    pub unique_only: bool,
}

/// Capability interface a storage backend implements.
///
/// Lifecycle methods mirror the connection manager contract; query methods
/// are the funnel every data operation goes through.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Prepare the backend for traffic. Network backends run migrations
    /// eagerly here; the local backend defers them to `run_migrations`.
    async fn init(&self) -> Result<()>;

    /// Apply pending schema migrations, idempotently.
    async fn run_migrations(&self) -> Result<()>;

    /// Liveness probe: a trivial round trip.
    async fn is_ready(&self) -> Result<bool>;

    /// Graceful shutdown. Idempotent; in-flight operations drain, later
    /// ones fail with a shutdown error.
    async fn close(&self) -> Result<()>;

    /// The live pool handle; fails once shutdown has begun.
    fn connection(&self) -> Result<DatabaseConnection>;

    /// Execute a statement, returning the affected-row count.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64>;

    /// Fetch all rows for a query.
    async fn fetch_all(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>>;

    /// Execute several statements in one transaction.
    async fn execute_transaction(&self, statements: &[Statement]) -> Result<()>;

    /// Statement storing a memory's embedding, in the backend's vector
    /// representation. Runs inside the create-memory transaction.
    fn embedding_upsert(
        &self,
        embedding_id: Uuid,
        memory_id: Uuid,
        dimension: EmbeddingDimension,
        vector: &[f32],
        created_at: DateTime<Utc>,
    ) -> Statement;

    /// Load the stored embedding for one memory, if any.
    async fn fetch_embedding(
        &self,
        memory_id: Uuid,
        dimension: EmbeddingDimension,
    ) -> Result<Option<Vec<f32>>>;

    /// Similarity search on the active dimension, nearest first, filtered
    /// to the distance threshold.
    async fn search_embeddings(&self, query: &VectorSearchQuery) -> Result<Vec<SqlRow>>;
}

/// Canonical timestamp encoding: RFC 3339 UTC with microseconds. Both
/// backends emit and parse this form, and it sorts lexicographically,
/// which the SQLite backend relies on for range filters.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AdapterError::Database(format!("malformed timestamp '{text}': {e}")))
}

// =============================================================================
// Row decoding helpers
// =============================================================================

fn missing(row: &SqlRow, column: &str) -> AdapterError {
    let have: Vec<&str> = row.keys().map(String::as_str).collect();
    AdapterError::Database(format!(
        "column '{column}' absent from result row (columns: {have:?})"
    ))
}

pub(crate) fn col_uuid(row: &SqlRow, column: &str) -> Result<Uuid> {
    match row.get(column) {
        Some(Value::String(s)) => {
            Uuid::parse_str(s).map_err(|e| AdapterError::Database(format!("column '{column}': {e}")))
        }
        Some(other) => Err(AdapterError::Database(format!(
            "column '{column}' is not a UUID: {other}"
        ))),
        None => Err(missing(row, column)),
    }
}

pub(crate) fn col_uuid_opt(row: &SqlRow, column: &str) -> Result<Option<Uuid>> {
    match row.get(column) {
        None | Some(Value::Null) => Ok(None),
        _ => col_uuid(row, column).map(Some),
    }
}

pub(crate) fn col_str(row: &SqlRow, column: &str) -> Result<String> {
    match row.get(column) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(AdapterError::Database(format!(
            "column '{column}' is not text: {other}"
        ))),
        None => Err(missing(row, column)),
    }
}

pub(crate) fn col_str_opt(row: &SqlRow, column: &str) -> Result<Option<String>> {
    match row.get(column) {
        None | Some(Value::Null) => Ok(None),
        _ => col_str(row, column).map(Some),
    }
}

/// Booleans come back natively from Postgres and as 0/1 from SQLite.
pub(crate) fn col_bool(row: &SqlRow, column: &str) -> Result<bool> {
    match row.get(column) {
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) => Ok(n.as_i64().unwrap_or(0) != 0),
        Some(other) => Err(AdapterError::Database(format!(
            "column '{column}' is not a boolean: {other}"
        ))),
        None => Err(missing(row, column)),
    }
}

pub(crate) fn col_i64(row: &SqlRow, column: &str) -> Result<i64> {
    match row.get(column) {
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
            AdapterError::Database(format!("column '{column}' does not fit in i64"))
        }),
        Some(other) => Err(AdapterError::Database(format!(
            "column '{column}' is not an integer: {other}"
        ))),
        None => Err(missing(row, column)),
    }
}

pub(crate) fn col_f64_opt(row: &SqlRow, column: &str) -> Result<Option<f64>> {
    match row.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(other) => Err(AdapterError::Database(format!(
            "column '{column}' is not a number: {other}"
        ))),
    }
}

/// JSON blobs are native on Postgres and TEXT-encoded on SQLite.
pub(crate) fn col_json(row: &SqlRow, column: &str) -> Result<Value> {
    match row.get(column) {
        None | Some(Value::Null) => Ok(Value::Null),
        Some(Value::String(s)) => serde_json::from_str(s)
            .map_err(|e| AdapterError::Database(format!("column '{column}' is not JSON: {e}"))),
        Some(other) => Ok(other.clone()),
    }
}

pub(crate) fn col_string_vec(row: &SqlRow, column: &str) -> Result<Vec<String>> {
    match col_json(row, column)? {
        Value::Null => Ok(Vec::new()),
        value => serde_json::from_value(value).map_err(|e| {
            AdapterError::Database(format!("column '{column}' is not a string array: {e}"))
        }),
    }
}

pub(crate) fn col_timestamp_opt(row: &SqlRow, column: &str) -> Result<Option<DateTime<Utc>>> {
    match row.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => parse_timestamp(s).map(Some),
        Some(other) => Err(AdapterError::Database(format!(
            "column '{column}' is not a timestamp: {other}"
        ))),
    }
}
