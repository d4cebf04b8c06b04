//! Cache table: agent-scoped key/value storage with optional expiry.

use crate::backend::{col_json, col_timestamp_opt, SqlRow};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;

pub const PG_CREATE_CACHE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS cache (
    key TEXT NOT NULL,
    agent_id UUID REFERENCES agents(id) ON DELETE CASCADE NOT NULL,
    value JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    expires_at TIMESTAMPTZ,
    PRIMARY KEY (key, agent_id)
)
"#;

pub const PG_CREATE_CACHE_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_cache_expires_at ON cache (expires_at);
"#;

pub const SQLITE_CREATE_CACHE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS cache (
    key TEXT NOT NULL,
    agent_id TEXT NOT NULL REFERENCES agents(id) ON DELETE CASCADE,
    value TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    expires_at TEXT,
    PRIMARY KEY (key, agent_id)
)
"#;

pub const SQLITE_CREATE_CACHE_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_cache_expires_at ON cache (expires_at);
"#;

pub(crate) struct CacheRow {
    pub value: Value,
    pub expires_at: Option<DateTime<Utc>>,
}

pub(crate) fn cache_from_row(row: &SqlRow) -> Result<CacheRow> {
    Ok(CacheRow {
        value: col_json(row, "value")?,
        expires_at: col_timestamp_opt(row, "expires_at")?,
    })
}
