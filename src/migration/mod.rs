//! Versioned schema migrations with a persistent ledger.
//!
//! Every migration is an ordered list of SQL statements. Each statement is
//! idempotent (`IF NOT EXISTS` throughout) and the ledger row is written only
//! after the whole step succeeds, so a crash mid-migration re-runs the
//! remaining statements harmlessly on the next start. Re-running the migrator
//! is a no-op once the ledger is current. A database whose ledger is ahead of
//! this build is refused rather than downgraded.

use crate::error::{AdapterError, Result};
use crate::schema;
use crate::schema::embedding::{pg_vector_index_sql, EmbeddingDimension};
use chrono::{SecondsFormat, Utc};
use sqlx::{PgPool, SqlitePool};
use tracing::{debug, info};

/// One schema version step. Statements run in order; each must be
/// individually idempotent.
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub statements: Vec<String>,
}

const PG_CREATE_MIGRATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS migrations (
    version BIGINT PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const SQLITE_CREATE_MIGRATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL
)
"#;

/// The ordered migration set for PostgreSQL. Version 1 creates the core
/// schema; versions 2 through 7 build one vector index per supported
/// dimension so a slow index build cannot hold the base tables hostage.
pub fn postgres_migrations() -> Vec<Migration> {
    let mut migrations = vec![Migration {
        version: 1,
        name: "initial_schema",
        statements: vec![
            "CREATE EXTENSION IF NOT EXISTS vector".to_string(),
            "CREATE EXTENSION IF NOT EXISTS fuzzystrmatch".to_string(),
            schema::agent::PG_CREATE_AGENTS_TABLE.to_string(),
            schema::agent::PG_CREATE_AGENTS_INDEXES.to_string(),
            schema::entity::PG_CREATE_ENTITIES_TABLE.to_string(),
            schema::entity::PG_CREATE_ENTITIES_INDEXES.to_string(),
            schema::world::PG_CREATE_WORLDS_TABLE.to_string(),
            schema::world::PG_CREATE_WORLDS_INDEXES.to_string(),
            schema::room::PG_CREATE_ROOMS_TABLE.to_string(),
            schema::room::PG_CREATE_ROOMS_INDEXES.to_string(),
            schema::participant::PG_CREATE_PARTICIPANTS_TABLE.to_string(),
            schema::participant::PG_CREATE_PARTICIPANTS_INDEXES.to_string(),
            schema::memory::PG_CREATE_MEMORIES_TABLE.to_string(),
            schema::memory::PG_CREATE_MEMORIES_INDEXES.to_string(),
            schema::embedding::PG_CREATE_EMBEDDINGS_TABLE.to_string(),
            schema::embedding::PG_CREATE_EMBEDDINGS_INDEXES.to_string(),
            schema::relationship::PG_CREATE_RELATIONSHIPS_TABLE.to_string(),
            schema::relationship::PG_CREATE_RELATIONSHIPS_INDEXES.to_string(),
            schema::task::PG_CREATE_TASKS_TABLE.to_string(),
            schema::task::PG_CREATE_TASKS_INDEXES.to_string(),
            schema::log::PG_CREATE_LOGS_TABLE.to_string(),
            schema::log::PG_CREATE_LOGS_INDEXES.to_string(),
            schema::cache::PG_CREATE_CACHE_TABLE.to_string(),
            schema::cache::PG_CREATE_CACHE_INDEXES.to_string(),
        ],
    }];

    let index_steps: [(i64, &'static str, EmbeddingDimension); 6] = [
        (2, "vector_index_384", EmbeddingDimension::D384),
        (3, "vector_index_512", EmbeddingDimension::D512),
        (4, "vector_index_768", EmbeddingDimension::D768),
        (5, "vector_index_1024", EmbeddingDimension::D1024),
        (6, "vector_index_1536", EmbeddingDimension::D1536),
        (7, "vector_index_3072", EmbeddingDimension::D3072),
    ];
    for (version, name, dimension) in index_steps {
        migrations.push(Migration {
            version,
            name,
            statements: vec![pg_vector_index_sql(dimension)],
        });
    }
    migrations
}

/// The ordered migration set for SQLite. Embeddings live in a single BLOB
/// column, so there are no per-dimension index steps.
pub fn sqlite_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        name: "initial_schema",
        statements: vec![
            schema::agent::SQLITE_CREATE_AGENTS_TABLE.to_string(),
            schema::agent::SQLITE_CREATE_AGENTS_INDEXES.to_string(),
            schema::entity::SQLITE_CREATE_ENTITIES_TABLE.to_string(),
            schema::entity::SQLITE_CREATE_ENTITIES_INDEXES.to_string(),
            schema::world::SQLITE_CREATE_WORLDS_TABLE.to_string(),
            schema::world::SQLITE_CREATE_WORLDS_INDEXES.to_string(),
            schema::room::SQLITE_CREATE_ROOMS_TABLE.to_string(),
            schema::room::SQLITE_CREATE_ROOMS_INDEXES.to_string(),
            schema::participant::SQLITE_CREATE_PARTICIPANTS_TABLE.to_string(),
            schema::participant::SQLITE_CREATE_PARTICIPANTS_INDEXES.to_string(),
            schema::memory::SQLITE_CREATE_MEMORIES_TABLE.to_string(),
            schema::memory::SQLITE_CREATE_MEMORIES_INDEXES.to_string(),
            schema::embedding::SQLITE_CREATE_EMBEDDINGS_TABLE.to_string(),
            schema::embedding::SQLITE_CREATE_EMBEDDINGS_INDEXES.to_string(),
            schema::relationship::SQLITE_CREATE_RELATIONSHIPS_TABLE.to_string(),
            schema::relationship::SQLITE_CREATE_RELATIONSHIPS_INDEXES.to_string(),
            schema::task::SQLITE_CREATE_TASKS_TABLE.to_string(),
            schema::task::SQLITE_CREATE_TASKS_INDEXES.to_string(),
            schema::log::SQLITE_CREATE_LOGS_TABLE.to_string(),
            schema::log::SQLITE_CREATE_LOGS_INDEXES.to_string(),
            schema::cache::SQLITE_CREATE_CACHE_TABLE.to_string(),
            schema::cache::SQLITE_CREATE_CACHE_INDEXES.to_string(),
        ],
    }]
}

/// Splits a DDL block into individual statements. The schema constants keep
/// related statements together in one string; the drivers prepare one
/// statement at a time.
fn split_statements(sql: &str) -> impl Iterator<Item = &str> {
    sql.split(';').map(str::trim).filter(|s| !s.is_empty())
}

fn check_not_ahead(current: i64, migrations: &[Migration]) -> Result<()> {
    let latest = migrations.iter().map(|m| m.version).max().unwrap_or(0);
    if current > latest {
        return Err(AdapterError::migration(format!(
            "database schema is at version {current} but this build only knows version {latest}; \
             refusing to run against a newer schema"
        )));
    }
    Ok(())
}

/// Applies all pending PostgreSQL migrations. Idempotent.
pub async fn run_postgres_migrations(pool: &PgPool) -> Result<()> {
    for statement in split_statements(PG_CREATE_MIGRATIONS_TABLE) {
        sqlx::query(statement).execute(pool).await?;
    }

    let current: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM migrations")
        .fetch_one(pool)
        .await?;
    let migrations = postgres_migrations();
    check_not_ahead(current, &migrations)?;

    for migration in migrations.iter().filter(|m| m.version > current) {
        info!(version = migration.version, name = migration.name, "applying migration");
        for statement in migration.statements.iter().flat_map(|s| split_statements(s)) {
            sqlx::query(statement).execute(pool).await?;
        }
        sqlx::query("INSERT INTO migrations (version, name) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.name)
            .execute(pool)
            .await?;
    }
    debug!(version = migrations.last().map(|m| m.version), "schema is current");
    Ok(())
}

/// Applies all pending SQLite migrations. Idempotent.
pub async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<()> {
    for statement in split_statements(SQLITE_CREATE_MIGRATIONS_TABLE) {
        sqlx::query(statement).execute(pool).await?;
    }

    let current: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM migrations")
        .fetch_one(pool)
        .await?;
    let migrations = sqlite_migrations();
    check_not_ahead(current, &migrations)?;

    for migration in migrations.iter().filter(|m| m.version > current) {
        info!(version = migration.version, name = migration.name, "applying migration");
        for statement in migration.statements.iter().flat_map(|s| split_statements(s)) {
            sqlx::query(statement).execute(pool).await?;
        }
        sqlx::query("INSERT INTO migrations (version, name, applied_at) VALUES (?, ?, ?)")
            .bind(migration.version)
            .bind(migration.name)
            .bind(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
            .execute(pool)
            .await?;
    }
    debug!(version = migrations.last().map(|m| m.version), "schema is current");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_strictly_increasing() {
        for set in [postgres_migrations(), sqlite_migrations()] {
            let versions: Vec<i64> = set.iter().map(|m| m.version).collect();
            let mut sorted = versions.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(versions, sorted);
        }
    }

    #[test]
    fn index_blocks_split_into_single_statements() {
        let parts: Vec<&str> =
            split_statements(schema::memory::PG_CREATE_MEMORIES_INDEXES).collect();
        assert_eq!(parts.len(), 4);
        assert!(parts.iter().all(|p| p.starts_with("CREATE INDEX")));

        for set in [postgres_migrations(), sqlite_migrations()] {
            for migration in &set {
                for statement in migration.statements.iter().flat_map(|s| split_statements(s)) {
                    assert!(!statement.contains(';'), "unsplit statement: {statement}");
                }
            }
        }
    }

    #[test]
    fn refuses_schema_from_the_future() {
        let err = check_not_ahead(99, &sqlite_migrations()).unwrap_err();
        assert!(matches!(err, AdapterError::Migration(_)));
    }

    #[test]
    fn past_and_present_versions_are_accepted() {
        let migrations = postgres_migrations();
        let latest = migrations.last().map(|m| m.version).unwrap();
        assert!(check_not_ahead(0, &migrations).is_ok());
        assert!(check_not_ahead(latest, &migrations).is_ok());
    }
}
