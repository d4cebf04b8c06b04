//! Worlds table: optional grouping of rooms (e.g. a server).

use crate::backend::{col_json, col_str, col_str_opt, col_timestamp_opt, col_uuid, SqlRow};
use crate::error::Result;
use crate::types::World;

pub const PG_CREATE_WORLDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS worlds (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    agent_id UUID REFERENCES agents(id) ON DELETE CASCADE NOT NULL,
    name TEXT NOT NULL,
    server_id TEXT,
    metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

pub const PG_CREATE_WORLDS_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_worlds_agent_id ON worlds (agent_id);
"#;

pub const SQLITE_CREATE_WORLDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS worlds (
    id TEXT PRIMARY KEY,
    agent_id TEXT NOT NULL REFERENCES agents(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    server_id TEXT,
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL
)
"#;

pub const SQLITE_CREATE_WORLDS_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_worlds_agent_id ON worlds (agent_id);
"#;

pub(crate) fn world_from_row(row: &SqlRow) -> Result<World> {
    Ok(World {
        id: col_uuid(row, "id")?,
        agent_id: col_uuid(row, "agent_id")?,
        name: col_str(row, "name")?,
        server_id: col_str_opt(row, "server_id")?,
        metadata: col_json(row, "metadata")?,
        created_at: col_timestamp_opt(row, "created_at")?,
    })
}
