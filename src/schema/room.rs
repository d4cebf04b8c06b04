//! Rooms table: conversation contexts.
//!
//! Deleting a room cascades to its memories, participants, and logs;
//! deleting a world cascades to its rooms.

use crate::backend::{
    col_json, col_str, col_str_opt, col_timestamp_opt, col_uuid, col_uuid_opt, SqlRow,
};
use crate::error::Result;
use crate::types::{ChannelType, Room};

pub const PG_CREATE_ROOMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS rooms (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    agent_id UUID REFERENCES agents(id) ON DELETE CASCADE NOT NULL,
    name TEXT,
    source TEXT NOT NULL,
    type TEXT NOT NULL,
    channel_id TEXT,
    world_id UUID REFERENCES worlds(id) ON DELETE CASCADE,
    metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

pub const PG_CREATE_ROOMS_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_rooms_agent_id ON rooms (agent_id);
CREATE INDEX IF NOT EXISTS idx_rooms_world_id ON rooms (world_id);
"#;

pub const SQLITE_CREATE_ROOMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS rooms (
    id TEXT PRIMARY KEY,
    agent_id TEXT NOT NULL REFERENCES agents(id) ON DELETE CASCADE,
    name TEXT,
    source TEXT NOT NULL,
    type TEXT NOT NULL,
    channel_id TEXT,
    world_id TEXT REFERENCES worlds(id) ON DELETE CASCADE,
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL
)
"#;

pub const SQLITE_CREATE_ROOMS_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_rooms_agent_id ON rooms (agent_id);
CREATE INDEX IF NOT EXISTS idx_rooms_world_id ON rooms (world_id);
"#;

pub(crate) fn room_from_row(row: &SqlRow) -> Result<Room> {
    Ok(Room {
        id: col_uuid(row, "id")?,
        agent_id: col_uuid(row, "agent_id")?,
        name: col_str_opt(row, "name")?,
        source: col_str(row, "source")?,
        room_type: ChannelType::parse(&col_str(row, "type")?),
        channel_id: col_str_opt(row, "channel_id")?,
        world_id: col_uuid_opt(row, "world_id")?,
        metadata: col_json(row, "metadata")?,
        created_at: col_timestamp_opt(row, "created_at")?,
    })
}
