//! SQLite [`Backend`] implementation.
//!
//! `?` placeholders are native, so SQL passes through untouched. UUIDs,
//! JSON, and timestamps are TEXT-encoded; embeddings are little-endian f32
//! blobs ranked in process, since SQLite has no vector extension in this
//! deployment.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row, SqlitePool, TypeInfo};
use uuid::Uuid;

use crate::backend::{
    format_timestamp, Backend, DatabaseConnection, SqlRow, SqlValue, Statement, VectorSearchQuery,
};
use crate::base::BaseAdapter;
use crate::error::Result;
use crate::migration::run_sqlite_migrations;
use crate::schema::embedding::{blob_to_vector, cosine_distance, vector_to_blob, EmbeddingDimension};
use crate::schema::memory::MEMORY_COLUMNS;

use super::manager::{SqliteConnectionManager, MEMORY_PATH};

/// Adapter backed by an embedded SQLite database.
pub type SqliteAdapter = BaseAdapter<SqliteBackend>;

impl BaseAdapter<SqliteBackend> {
    /// Open a file-backed database, creating it if missing.
    pub async fn open(path: &str, agent_id: Uuid) -> Result<Self> {
        let backend = SqliteBackend::open(path).await?;
        Ok(BaseAdapter::new(backend, agent_id))
    }

    /// Open a private in-memory database. Used by tests and ephemeral
    /// deployments.
    pub async fn open_in_memory(agent_id: Uuid) -> Result<Self> {
        Self::open(MEMORY_PATH, agent_id).await
    }
}

pub struct SqliteBackend {
    manager: SqliteConnectionManager,
}

impl SqliteBackend {
    pub async fn open(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::open(path).await?;
        Ok(Self { manager })
    }

    fn pool(&self) -> Result<&SqlitePool> {
        self.manager.pool()
    }
}

fn bind_value<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>>,
    value: &SqlValue,
) -> sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Uuid(v) => query.bind(v.to_string()),
        SqlValue::UuidOpt(v) => query.bind(v.map(|u| u.to_string())),
        SqlValue::Text(v) => query.bind(v.clone()),
        SqlValue::TextOpt(v) => query.bind(v.clone()),
        SqlValue::Bool(v) => query.bind(*v),
        SqlValue::I64(v) => query.bind(*v),
        SqlValue::F64(v) => query.bind(*v),
        SqlValue::Json(v) => query.bind(v.to_string()),
        SqlValue::Timestamp(v) => query.bind(format_timestamp(*v)),
        SqlValue::TimestampOpt(v) => query.bind(v.map(format_timestamp)),
        SqlValue::Vector(v) => query.bind(vector_to_blob(v)),
    }
}

/// Normalize a driver row to a JSON object. TEXT stays text (the shared
/// decoders parse UUIDs, JSON, and timestamps from it); blobs carry no
/// portable JSON form and decode as null.
fn row_to_json(row: &SqliteRow) -> Result<SqlRow> {
    let mut out = SqlRow::new();
    for (i, column) in row.columns().iter().enumerate() {
        let name = column.name().to_string();
        let value = match column.type_info().name() {
            "TEXT" => row
                .try_get::<Option<String>, _>(i)?
                .map_or(Value::Null, Value::String),
            "INTEGER" => row
                .try_get::<Option<i64>, _>(i)?
                .map_or(Value::Null, Value::from),
            "REAL" => row
                .try_get::<Option<f64>, _>(i)?
                .map_or(Value::Null, Value::from),
            "BOOLEAN" => row
                .try_get::<Option<bool>, _>(i)?
                .map_or(Value::Null, Value::Bool),
            "BLOB" => Value::Null,
            _ => row
                .try_get::<Option<String>, _>(i)
                .ok()
                .flatten()
                .map_or(Value::Null, Value::String),
        };
        out.insert(name, value);
    }
    Ok(out)
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn init(&self) -> Result<()> {
        // Embedded backend: migrations are deferred to an explicit
        // `run_migrations` call; init only verifies the file is usable.
        sqlx::query("SELECT 1").execute(self.pool()?).await?;
        Ok(())
    }

    async fn run_migrations(&self) -> Result<()> {
        run_sqlite_migrations(self.pool()?).await
    }

    async fn is_ready(&self) -> Result<bool> {
        if self.manager.is_shutting_down() {
            return Ok(false);
        }
        sqlx::query("SELECT 1").execute(self.pool()?).await?;
        Ok(true)
    }

    async fn close(&self) -> Result<()> {
        self.manager.close().await
    }

    fn connection(&self) -> Result<DatabaseConnection> {
        Ok(DatabaseConnection::Sqlite(self.pool()?.clone()))
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_value(query, param);
        }
        let result = query.execute(self.pool()?).await?;
        Ok(result.rows_affected())
    }

    async fn fetch_all(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_value(query, param);
        }
        let rows = query.fetch_all(self.pool()?).await?;
        rows.iter().map(row_to_json).collect()
    }

    async fn execute_transaction(&self, statements: &[Statement]) -> Result<()> {
        let mut tx = self.pool()?.begin().await?;
        for (sql, params) in statements {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_value(query, param);
            }
            query.execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    fn embedding_upsert(
        &self,
        embedding_id: Uuid,
        memory_id: Uuid,
        dimension: EmbeddingDimension,
        vector: &[f32],
        created_at: DateTime<Utc>,
    ) -> Statement {
        (
            "INSERT INTO embeddings (id, memory_id, created_at, dimension, embedding) \
             VALUES (?, ?, ?, ?, ?) ON CONFLICT (memory_id) DO UPDATE SET \
             dimension = excluded.dimension, embedding = excluded.embedding, \
             created_at = excluded.created_at"
                .to_string(),
            vec![
                SqlValue::Uuid(embedding_id),
                SqlValue::Uuid(memory_id),
                SqlValue::Timestamp(created_at),
                SqlValue::I64(dimension.size() as i64),
                SqlValue::Vector(vector.to_vec()),
            ],
        )
    }

    async fn fetch_embedding(
        &self,
        memory_id: Uuid,
        dimension: EmbeddingDimension,
    ) -> Result<Option<Vec<f32>>> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as(
            "SELECT embedding FROM embeddings WHERE memory_id = ? AND dimension = ?",
        )
        .bind(memory_id.to_string())
        .bind(dimension.size() as i64)
        .fetch_optional(self.pool()?)
        .await?;
        match row {
            Some((blob,)) => Ok(Some(blob_to_vector(&blob)?)),
            None => Ok(None),
        }
    }

    async fn search_embeddings(&self, query: &VectorSearchQuery) -> Result<Vec<SqlRow>> {
        let memory_cols: String = MEMORY_COLUMNS
            .split(", ")
            .map(|c| format!("m.{c}"))
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!(
            "SELECT {memory_cols}, e.embedding AS embedding \
             FROM memories m JOIN embeddings e ON e.memory_id = m.id \
             WHERE m.agent_id = ? AND m.type = ? AND e.dimension = ?"
        );
        let mut params = vec![
            SqlValue::Uuid(query.agent_id),
            SqlValue::Text(query.table_name.clone()),
            SqlValue::I64(query.dimension.size() as i64),
        ];
        if let Some(room_id) = query.room_id {
            sql.push_str(" AND m.room_id = ?");
            params.push(SqlValue::Uuid(room_id));
        }
        if let Some(world_id) = query.world_id {
            sql.push_str(" AND m.world_id = ?");
            params.push(SqlValue::Uuid(world_id));
        }
        if let Some(entity_id) = query.entity_id {
            sql.push_str(" AND m.entity_id = ?");
            params.push(SqlValue::Uuid(entity_id));
        }
        if query.unique_only {
            sql.push_str(" AND m.\"unique\" = ?");
            params.push(SqlValue::Bool(true));
        }

        let mut bound = sqlx::query(&sql);
        for param in &params {
            bound = bind_value(bound, param);
        }
        let rows = bound.fetch_all(self.pool()?).await?;

        // Rank in process: decode each candidate blob and keep those
        // within the distance threshold.
        let mut scored: Vec<(f64, SqlRow)> = Vec::with_capacity(rows.len());
        for row in &rows {
            let blob: Vec<u8> = row.try_get("embedding")?;
            let candidate = blob_to_vector(&blob)?;
            let distance = cosine_distance(&query.embedding, &candidate);
            if distance <= query.distance_threshold {
                let mut obj = row_to_json(row)?;
                obj.remove("embedding");
                obj.insert("distance".to_string(), Value::from(distance));
                scored.push((distance, obj));
            }
        }
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(query.count.max(0) as usize);
        Ok(scored.into_iter().map(|(_, row)| row).collect())
    }
}
