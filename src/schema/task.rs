//! Tasks table: persisted work items scheduled elsewhere in the runtime.

use crate::backend::{
    col_json, col_str, col_str_opt, col_string_vec, col_timestamp_opt, col_uuid, col_uuid_opt,
    SqlRow,
};
use crate::error::Result;
use crate::types::Task;

pub const PG_CREATE_TASKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    agent_id UUID REFERENCES agents(id) ON DELETE CASCADE NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    room_id UUID REFERENCES rooms(id) ON DELETE CASCADE,
    world_id UUID REFERENCES worlds(id) ON DELETE CASCADE,
    entity_id UUID REFERENCES entities(id) ON DELETE CASCADE,
    tags JSONB NOT NULL DEFAULT '[]'::jsonb,
    metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

pub const PG_CREATE_TASKS_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_tasks_agent_id ON tasks (agent_id);
CREATE INDEX IF NOT EXISTS idx_tasks_name ON tasks (name);
CREATE INDEX IF NOT EXISTS idx_tasks_room_id ON tasks (room_id);
"#;

pub const SQLITE_CREATE_TASKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    agent_id TEXT NOT NULL REFERENCES agents(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    description TEXT,
    room_id TEXT REFERENCES rooms(id) ON DELETE CASCADE,
    world_id TEXT REFERENCES worlds(id) ON DELETE CASCADE,
    entity_id TEXT REFERENCES entities(id) ON DELETE CASCADE,
    tags TEXT NOT NULL DEFAULT '[]',
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

pub const SQLITE_CREATE_TASKS_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_tasks_agent_id ON tasks (agent_id);
CREATE INDEX IF NOT EXISTS idx_tasks_name ON tasks (name);
CREATE INDEX IF NOT EXISTS idx_tasks_room_id ON tasks (room_id);
"#;

pub(crate) fn task_from_row(row: &SqlRow) -> Result<Task> {
    Ok(Task {
        id: Some(col_uuid(row, "id")?),
        agent_id: col_uuid(row, "agent_id")?,
        name: col_str(row, "name")?,
        description: col_str_opt(row, "description")?,
        room_id: col_uuid_opt(row, "room_id")?,
        world_id: col_uuid_opt(row, "world_id")?,
        entity_id: col_uuid_opt(row, "entity_id")?,
        tags: col_string_vec(row, "tags")?,
        metadata: col_json(row, "metadata")?,
        created_at: col_timestamp_opt(row, "created_at")?,
        updated_at: col_timestamp_opt(row, "updated_at")?,
    })
}
