//! Participants table: entity/room join records.

use crate::backend::{col_str_opt, col_timestamp_opt, col_uuid, SqlRow};
use crate::error::Result;
use crate::types::Participant;

pub const PG_CREATE_PARTICIPANTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS participants (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    entity_id UUID REFERENCES entities(id) ON DELETE CASCADE NOT NULL,
    room_id UUID REFERENCES rooms(id) ON DELETE CASCADE NOT NULL,
    user_state TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (entity_id, room_id)
)
"#;

pub const PG_CREATE_PARTICIPANTS_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_participants_room_id ON participants (room_id);
CREATE INDEX IF NOT EXISTS idx_participants_entity_id ON participants (entity_id);
"#;

pub const SQLITE_CREATE_PARTICIPANTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS participants (
    id TEXT PRIMARY KEY,
    entity_id TEXT NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
    room_id TEXT NOT NULL REFERENCES rooms(id) ON DELETE CASCADE,
    user_state TEXT,
    created_at TEXT NOT NULL,
    UNIQUE (entity_id, room_id)
)
"#;

pub const SQLITE_CREATE_PARTICIPANTS_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_participants_room_id ON participants (room_id);
CREATE INDEX IF NOT EXISTS idx_participants_entity_id ON participants (entity_id);
"#;

pub(crate) fn participant_from_row(row: &SqlRow) -> Result<Participant> {
    Ok(Participant {
        id: col_uuid(row, "id")?,
        entity_id: col_uuid(row, "entity_id")?,
        room_id: col_uuid(row, "room_id")?,
        user_state: col_str_opt(row, "user_state")?,
        created_at: col_timestamp_opt(row, "created_at")?,
    })
}
