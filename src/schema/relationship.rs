//! Relationships table: directed entity-to-entity edges per agent.

use crate::backend::{col_json, col_string_vec, col_timestamp_opt, col_uuid, SqlRow};
use crate::error::Result;
use crate::types::Relationship;

pub const PG_CREATE_RELATIONSHIPS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS relationships (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    source_entity_id UUID REFERENCES entities(id) ON DELETE CASCADE NOT NULL,
    target_entity_id UUID REFERENCES entities(id) ON DELETE CASCADE NOT NULL,
    agent_id UUID REFERENCES agents(id) ON DELETE CASCADE NOT NULL,
    tags JSONB NOT NULL DEFAULT '[]'::jsonb,
    metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

pub const PG_CREATE_RELATIONSHIPS_INDEXES: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS idx_relationships_unique
    ON relationships (source_entity_id, target_entity_id, agent_id);
CREATE INDEX IF NOT EXISTS idx_relationships_agent_id ON relationships (agent_id);
"#;

pub const SQLITE_CREATE_RELATIONSHIPS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS relationships (
    id TEXT PRIMARY KEY,
    source_entity_id TEXT NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
    target_entity_id TEXT NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
    agent_id TEXT NOT NULL REFERENCES agents(id) ON DELETE CASCADE,
    tags TEXT NOT NULL DEFAULT '[]',
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL
)
"#;

pub const SQLITE_CREATE_RELATIONSHIPS_INDEXES: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS idx_relationships_unique
    ON relationships (source_entity_id, target_entity_id, agent_id);
CREATE INDEX IF NOT EXISTS idx_relationships_agent_id ON relationships (agent_id);
"#;

pub(crate) fn relationship_from_row(row: &SqlRow) -> Result<Relationship> {
    Ok(Relationship {
        id: col_uuid(row, "id")?,
        source_entity_id: col_uuid(row, "source_entity_id")?,
        target_entity_id: col_uuid(row, "target_entity_id")?,
        agent_id: col_uuid(row, "agent_id")?,
        tags: col_string_vec(row, "tags")?,
        metadata: col_json(row, "metadata")?,
        created_at: col_timestamp_opt(row, "created_at")?,
    })
}
