//! Memories table: the central record.
//!
//! The `type` column is the logical table name ("messages", "documents",
//! "fragments", ...). The embedding lives in its own table and never
//! outlives the memory.

use crate::backend::{
    col_bool, col_f64_opt, col_json, col_timestamp_opt, col_uuid, col_uuid_opt, SqlRow,
};
use crate::error::Result;
use crate::types::Memory;

pub const PG_CREATE_MEMORIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS memories (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    type TEXT NOT NULL,
    entity_id UUID REFERENCES entities(id) ON DELETE CASCADE NOT NULL,
    agent_id UUID REFERENCES agents(id) ON DELETE CASCADE NOT NULL,
    room_id UUID REFERENCES rooms(id) ON DELETE CASCADE NOT NULL,
    world_id UUID REFERENCES worlds(id) ON DELETE SET NULL,
    content JSONB NOT NULL,
    "unique" BOOLEAN NOT NULL DEFAULT false,
    metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

pub const PG_CREATE_MEMORIES_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_memories_type_room ON memories (type, room_id);
CREATE INDEX IF NOT EXISTS idx_memories_agent_id ON memories (agent_id);
CREATE INDEX IF NOT EXISTS idx_memories_world_id ON memories (world_id);
CREATE INDEX IF NOT EXISTS idx_memories_created_at ON memories (created_at);
"#;

pub const SQLITE_CREATE_MEMORIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS memories (
    id TEXT PRIMARY KEY,
    type TEXT NOT NULL,
    entity_id TEXT NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
    agent_id TEXT NOT NULL REFERENCES agents(id) ON DELETE CASCADE,
    room_id TEXT NOT NULL REFERENCES rooms(id) ON DELETE CASCADE,
    world_id TEXT REFERENCES worlds(id) ON DELETE SET NULL,
    content TEXT NOT NULL,
    "unique" INTEGER NOT NULL DEFAULT 0,
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL
)
"#;

pub const SQLITE_CREATE_MEMORIES_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_memories_type_room ON memories (type, room_id);
CREATE INDEX IF NOT EXISTS idx_memories_agent_id ON memories (agent_id);
CREATE INDEX IF NOT EXISTS idx_memories_world_id ON memories (world_id);
CREATE INDEX IF NOT EXISTS idx_memories_created_at ON memories (created_at);
"#;

/// Columns selected whenever memories are read back.
pub const MEMORY_COLUMNS: &str =
    r#"id, type, entity_id, agent_id, room_id, world_id, content, "unique", metadata, created_at"#;

pub(crate) fn memory_from_row(row: &SqlRow) -> Result<Memory> {
    Ok(Memory {
        id: Some(col_uuid(row, "id")?),
        entity_id: col_uuid(row, "entity_id")?,
        agent_id: col_uuid(row, "agent_id")?,
        room_id: col_uuid(row, "room_id")?,
        world_id: col_uuid_opt(row, "world_id")?,
        content: col_json(row, "content")?,
        embedding: None,
        unique: col_bool(row, "unique")?,
        metadata: col_json(row, "metadata")?,
        created_at: col_timestamp_opt(row, "created_at")?,
        similarity: None,
    })
}

/// Decode a search result row: memory columns plus a `distance` column.
pub(crate) fn memory_from_search_row(row: &SqlRow) -> Result<Memory> {
    let mut memory = memory_from_row(row)?;
    if let Some(distance) = col_f64_opt(row, "distance")? {
        memory.similarity = Some(1.0 - distance);
    }
    Ok(memory)
}
