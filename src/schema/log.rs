//! Logs table: append-only audit records.

use crate::backend::{col_json, col_str, col_timestamp_opt, col_uuid, col_uuid_opt, SqlRow};
use crate::error::Result;
use crate::types::LogEntry;

pub const PG_CREATE_LOGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS logs (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    entity_id UUID REFERENCES entities(id) ON DELETE CASCADE NOT NULL,
    room_id UUID REFERENCES rooms(id) ON DELETE CASCADE,
    type TEXT NOT NULL,
    body JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

pub const PG_CREATE_LOGS_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_logs_entity_id ON logs (entity_id);
CREATE INDEX IF NOT EXISTS idx_logs_room_id ON logs (room_id);
CREATE INDEX IF NOT EXISTS idx_logs_type ON logs (type);
"#;

pub const SQLITE_CREATE_LOGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS logs (
    id TEXT PRIMARY KEY,
    entity_id TEXT NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
    room_id TEXT REFERENCES rooms(id) ON DELETE CASCADE,
    type TEXT NOT NULL,
    body TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL
)
"#;

pub const SQLITE_CREATE_LOGS_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_logs_entity_id ON logs (entity_id);
CREATE INDEX IF NOT EXISTS idx_logs_room_id ON logs (room_id);
CREATE INDEX IF NOT EXISTS idx_logs_type ON logs (type);
"#;

pub(crate) fn log_from_row(row: &SqlRow) -> Result<LogEntry> {
    Ok(LogEntry {
        id: col_uuid(row, "id")?,
        entity_id: col_uuid(row, "entity_id")?,
        room_id: col_uuid_opt(row, "room_id")?,
        log_type: col_str(row, "type")?,
        body: col_json(row, "body")?,
        created_at: col_timestamp_opt(row, "created_at")?,
    })
}
