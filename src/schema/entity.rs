//! Entities table: participants known to an agent.
//!
//! Deleting an entity cascades to its relationships and memories.

use crate::backend::{col_json, col_string_vec, col_timestamp_opt, col_uuid, SqlRow};
use crate::error::Result;
use crate::types::Entity;

pub const PG_CREATE_ENTITIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS entities (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    agent_id UUID REFERENCES agents(id) ON DELETE CASCADE NOT NULL,
    names JSONB NOT NULL DEFAULT '[]'::jsonb,
    metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (id, agent_id)
)
"#;

pub const PG_CREATE_ENTITIES_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_entities_agent_id ON entities (agent_id);
"#;

pub const SQLITE_CREATE_ENTITIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS entities (
    id TEXT PRIMARY KEY,
    agent_id TEXT NOT NULL REFERENCES agents(id) ON DELETE CASCADE,
    names TEXT NOT NULL DEFAULT '[]',
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    UNIQUE (id, agent_id)
)
"#;

pub const SQLITE_CREATE_ENTITIES_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_entities_agent_id ON entities (agent_id);
"#;

pub(crate) fn entity_from_row(row: &SqlRow) -> Result<Entity> {
    Ok(Entity {
        id: col_uuid(row, "id")?,
        agent_id: col_uuid(row, "agent_id")?,
        names: col_string_vec(row, "names")?,
        metadata: col_json(row, "metadata")?,
        created_at: col_timestamp_opt(row, "created_at")?,
    })
}
