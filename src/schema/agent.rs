//! Agents table: the owning principal every other table hangs off.

use crate::backend::{col_bool, col_json, col_str, col_timestamp_opt, col_uuid, SqlRow};
use crate::error::Result;
use crate::types::Agent;

pub const PG_CREATE_AGENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS agents (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name TEXT NOT NULL,
    settings JSONB NOT NULL DEFAULT '{}'::jsonb,
    enabled BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

pub const PG_CREATE_AGENTS_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_agents_name ON agents (name);
"#;

pub const SQLITE_CREATE_AGENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS agents (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    settings TEXT NOT NULL DEFAULT '{}',
    enabled INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

pub const SQLITE_CREATE_AGENTS_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_agents_name ON agents (name);
"#;

pub(crate) fn agent_from_row(row: &SqlRow) -> Result<Agent> {
    Ok(Agent {
        id: col_uuid(row, "id")?,
        name: col_str(row, "name")?,
        settings: col_json(row, "settings")?,
        enabled: col_bool(row, "enabled")?,
        created_at: col_timestamp_opt(row, "created_at")?,
        updated_at: col_timestamp_opt(row, "updated_at")?,
    })
}
