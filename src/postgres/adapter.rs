//! PostgreSQL [`Backend`] implementation.
//!
//! Portable SQL with `?` placeholders is renumbered to `$n` before it
//! reaches the driver. Vectors are bound in pgvector's text form and cast
//! in SQL; similarity search runs server-side on the active dimension
//! column.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{Column, PgPool, Row, TypeInfo};
use uuid::Uuid;

use crate::backend::{
    format_timestamp, Backend, DatabaseConnection, SqlRow, SqlValue, Statement, VectorSearchQuery,
};
use crate::base::BaseAdapter;
use crate::error::Result;
use crate::migration::run_postgres_migrations;
use crate::retry::RetryPolicy;
use crate::schema::embedding::{parse_vector_text, vector_to_text, EmbeddingDimension};
use crate::schema::memory::MEMORY_COLUMNS;

use super::manager::PostgresConnectionManager;

/// Adapter backed by a network PostgreSQL server.
pub type PostgresAdapter = BaseAdapter<PostgresBackend>;

impl BaseAdapter<PostgresBackend> {
    /// Connect with default retry behavior.
    pub async fn connect(url: &str, agent_id: Uuid) -> Result<Self> {
        Self::connect_with_retry(url, agent_id, RetryPolicy::default()).await
    }

    /// Connect with an explicit retry policy, applied both to the initial
    /// connection and to subsequent operations.
    pub async fn connect_with_retry(
        url: &str,
        agent_id: Uuid,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let backend = PostgresBackend::connect(url, &retry).await?;
        Ok(BaseAdapter::new(backend, agent_id).with_retry_policy(retry))
    }
}

pub struct PostgresBackend {
    manager: PostgresConnectionManager,
}

impl PostgresBackend {
    pub async fn connect(url: &str, retry: &RetryPolicy) -> Result<Self> {
        let manager = PostgresConnectionManager::connect(url, retry).await?;
        Ok(Self { manager })
    }

    fn pool(&self) -> Result<&PgPool> {
        self.manager.pool()
    }
}

/// Rewrite `?` placeholders to `$1..$n`, leaving quoted regions alone.
fn renumber_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0;
    let mut in_single = false;
    let mut in_double = false;
    for ch in sql.chars() {
        match ch {
            '\'' if !in_double => {
                in_single = !in_single;
                out.push(ch);
            }
            '"' if !in_single => {
                in_double = !in_double;
                out.push(ch);
            }
            '?' if !in_single && !in_double => {
                n += 1;
                out.push('$');
                out.push_str(&n.to_string());
            }
            _ => out.push(ch),
        }
    }
    out
}

fn bind_value<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    value: &SqlValue,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match value {
        SqlValue::Uuid(v) => query.bind(*v),
        SqlValue::UuidOpt(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.clone()),
        SqlValue::TextOpt(v) => query.bind(v.clone()),
        SqlValue::Bool(v) => query.bind(*v),
        SqlValue::I64(v) => query.bind(*v),
        SqlValue::F64(v) => query.bind(*v),
        SqlValue::Json(v) => query.bind(v.clone()),
        SqlValue::Timestamp(v) => query.bind(*v),
        SqlValue::TimestampOpt(v) => query.bind(*v),
        // Text form, cast with ::vector (or ::halfvec) in the SQL.
        SqlValue::Vector(v) => query.bind(vector_to_text(v)),
    }
}

/// Normalize a driver row to a JSON object, keyed by column name, using
/// the declared column types.
fn row_to_json(row: &PgRow) -> Result<SqlRow> {
    let mut out = SqlRow::new();
    for (i, column) in row.columns().iter().enumerate() {
        let name = column.name().to_string();
        let value = match column.type_info().name() {
            "UUID" => row
                .try_get::<Option<Uuid>, _>(i)?
                .map_or(Value::Null, |v| Value::String(v.to_string())),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => row
                .try_get::<Option<String>, _>(i)?
                .map_or(Value::Null, Value::String),
            "BOOL" => row
                .try_get::<Option<bool>, _>(i)?
                .map_or(Value::Null, Value::Bool),
            "INT2" => row
                .try_get::<Option<i16>, _>(i)?
                .map_or(Value::Null, |v| Value::from(i64::from(v))),
            "INT4" => row
                .try_get::<Option<i32>, _>(i)?
                .map_or(Value::Null, |v| Value::from(i64::from(v))),
            "INT8" => row
                .try_get::<Option<i64>, _>(i)?
                .map_or(Value::Null, Value::from),
            "FLOAT4" => row
                .try_get::<Option<f32>, _>(i)?
                .map_or(Value::Null, |v| Value::from(f64::from(v))),
            "FLOAT8" => row
                .try_get::<Option<f64>, _>(i)?
                .map_or(Value::Null, Value::from),
            "JSON" | "JSONB" => row.try_get::<Option<Value>, _>(i)?.unwrap_or(Value::Null),
            "TIMESTAMPTZ" => row
                .try_get::<Option<DateTime<Utc>>, _>(i)?
                .map_or(Value::Null, |v| Value::String(format_timestamp(v))),
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

/// Cosine-distance expression against the active column. The 3072 column
/// compares through halfvec so the expression matches its index.
fn distance_expr(dimension: EmbeddingDimension) -> String {
    let col = dimension.column();
    if dimension.size() > 2000 {
        let size = dimension.size();
        format!("(e.{col}::halfvec({size}) <=> ?::halfvec({size}))")
    } else {
        format!("(e.{col} <=> ?::vector)")
    }
}

#[async_trait]
impl Backend for PostgresBackend {
    async fn init(&self) -> Result<()> {
        // Network backend: schema is brought current before traffic.
        self.run_migrations().await
    }

    async fn run_migrations(&self) -> Result<()> {
        run_postgres_migrations(self.pool()?).await
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
        Ok(DatabaseConnection::Postgres(self.pool()?.clone()))
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let sql = renumber_placeholders(sql);
        let mut query = sqlx::query(&sql);
        for param in params {
            query = bind_value(query, param);
        }
        let result = query.execute(self.pool()?).await?;
        Ok(result.rows_affected())
    }

    async fn fetch_all(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>> {
        let sql = renumber_placeholders(sql);
        let mut query = sqlx::query(&sql);
        for param in params {
            query = bind_value(query, param);
        }
        let rows = query.fetch_all(self.pool()?).await?;
        rows.iter().map(row_to_json).collect()
    }

    async fn execute_transaction(&self, statements: &[Statement]) -> Result<()> {
        let mut tx = self.pool()?.begin().await?;
        for (sql, params) in statements {
            let sql = renumber_placeholders(sql);
            let mut query = sqlx::query(&sql);
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
        let col = dimension.column();
        // One populated column per row: switching dimensions clears the rest.
        let clear_others: String = EmbeddingDimension::ALL
            .iter()
            .filter(|d| **d != dimension)
            .map(|d| format!(", {} = NULL", d.column()))
            .collect();
        (
            format!(
                "INSERT INTO embeddings (id, memory_id, created_at, {col}) \
                 VALUES (?, ?, ?, ?::vector) ON CONFLICT (memory_id) DO UPDATE SET \
                 {col} = excluded.{col}, created_at = excluded.created_at{clear_others}"
            ),
            vec![
                SqlValue::Uuid(embedding_id),
                SqlValue::Uuid(memory_id),
                SqlValue::Timestamp(created_at),
                SqlValue::Vector(vector.to_vec()),
            ],
        )
    }

    async fn fetch_embedding(
        &self,
        memory_id: Uuid,
        dimension: EmbeddingDimension,
    ) -> Result<Option<Vec<f32>>> {
        let sql = format!(
            "SELECT {}::text AS embedding FROM embeddings WHERE memory_id = $1",
            dimension.column()
        );
        let row: Option<(Option<String>,)> = sqlx::query_as(&sql)
            .bind(memory_id)
            .fetch_optional(self.pool()?)
            .await?;
        match row.and_then(|(text,)| text) {
            Some(text) => Ok(Some(parse_vector_text(&text)?)),
            None => Ok(None),
        }
    }

    async fn search_embeddings(&self, query: &VectorSearchQuery) -> Result<Vec<SqlRow>> {
        let distance = distance_expr(query.dimension);
        let memory_cols: String = MEMORY_COLUMNS
            .split(", ")
            .map(|c| format!("m.{c}"))
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!(
            "SELECT {memory_cols}, {distance} AS distance \
             FROM memories m JOIN embeddings e ON e.memory_id = m.id \
             WHERE m.agent_id = ? AND m.type = ? AND e.{col} IS NOT NULL",
            col = query.dimension.column()
        );
        let mut params = vec![
            SqlValue::Vector(query.embedding.clone()),
            SqlValue::Uuid(query.agent_id),
            SqlValue::Text(query.table_name.clone()),
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
        sql.push_str(&format!(" AND {distance} <= ? ORDER BY distance ASC LIMIT ?"));
        params.push(SqlValue::Vector(query.embedding.clone()));
        params.push(SqlValue::F64(query.distance_threshold));
        params.push(SqlValue::I64(query.count));

        self.fetch_all(&sql, &params).await
    }
}
