//! Domain types persisted by the adapter layer.
//!
//! Every record is scoped to an owning agent; the adapter never performs
//! cross-agent joins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{AdapterError, Result};

/// The owning principal. Created at provisioning; the id is immutable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Agent {
    pub id: Uuid,
    pub name: String,
    /// Free-form configuration blob (character settings, model choice, ...).
    #[serde(default)]
    pub settings: Value,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// A participant (user, bot, or external actor) known to an agent.
///
/// The same global id may exist under several agents; `(id, agent_id)` is
/// the unit of uniqueness.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entity {
    pub id: Uuid,
    pub agent_id: Uuid,
    /// Display names, in the order they were observed.
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub metadata: Value,
    pub created_at: Option<DateTime<Utc>>,
}

/// Conversation context kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelType {
    Dm,
    Group,
    Voice,
    Feed,
    Thread,
    World,
}

impl ChannelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::Dm => "DM",
            ChannelType::Group => "GROUP",
            ChannelType::Voice => "VOICE",
            ChannelType::Feed => "FEED",
            ChannelType::Thread => "THREAD",
            ChannelType::World => "WORLD",
        }
    }

    pub fn parse(s: &str) -> ChannelType {
        match s {
            "DM" => ChannelType::Dm,
            "VOICE" => ChannelType::Voice,
            "FEED" => ChannelType::Feed,
            "THREAD" => ChannelType::Thread,
            "WORLD" => ChannelType::World,
            _ => ChannelType::Group,
        }
    }
}

/// A conversation context (channel, DM, group). Created on first
/// reference; never implicitly deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub name: Option<String>,
    /// Source platform tag ("discord", "telegram", "test", ...).
    pub source: String,
    pub room_type: ChannelType,
    pub channel_id: Option<String>,
    pub world_id: Option<Uuid>,
    #[serde(default)]
    pub metadata: Value,
    pub created_at: Option<DateTime<Utc>>,
}

/// Higher-level grouping of rooms (e.g. a server).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct World {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub name: String,
    /// External server identifier on the source platform.
    pub server_id: Option<String>,
    #[serde(default)]
    pub metadata: Value,
    pub created_at: Option<DateTime<Utc>>,
}

/// A stored utterance, document, or document fragment.
///
/// The type discriminator is the logical table name passed to
/// `create_memory` ("messages", "documents", "fragments", ...); the
/// metadata shape is validated against it at the storage boundary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Memory {
    pub id: Option<Uuid>,
    pub entity_id: Uuid,
    pub agent_id: Uuid,
    pub room_id: Uuid,
    pub world_id: Option<Uuid>,
    /// JSON content payload (text, attachments, source annotations).
    pub content: Value,
    /// Optional embedding vector; length must match the adapter's active
    /// dimension. Stored in a separate table, deleted with the memory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Marks a logical memory that similarity search may deduplicate on.
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub metadata: Value,
    pub created_at: Option<DateTime<Utc>>,
    /// Populated by `search_memories`: `1 - cosine distance`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

/// Directed, tagged edge between two entities, scoped to an agent.
/// `(source, target, agent)` is unique.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Relationship {
    pub id: Uuid,
    pub source_entity_id: Uuid,
    pub target_entity_id: Uuid,
    pub agent_id: Uuid,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: Value,
    pub created_at: Option<DateTime<Utc>>,
}

/// A schedulable unit of work. The adapter only persists it; scheduling
/// lives in the caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: Option<Uuid>,
    pub agent_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub room_id: Option<Uuid>,
    pub world_id: Option<Uuid>,
    pub entity_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Includes recurrence interval when the caller schedules repeats.
    #[serde(default)]
    pub metadata: Value,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Join record linking an entity to a room.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub entity_id: Uuid,
    pub room_id: Uuid,
    pub user_state: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Append-only audit record of a room/user event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub entity_id: Uuid,
    pub room_id: Option<Uuid>,
    pub log_type: String,
    pub body: Value,
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Operation parameters
// =============================================================================

/// Filters for `get_memories`.
#[derive(Clone, Debug, Default)]
pub struct GetMemoriesParams {
    /// Logical table name ("messages", "documents", ...). Required.
    pub table_name: String,
    pub entity_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub world_id: Option<Uuid>,
    /// Restrict to memories flagged unique.
    pub unique: bool,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub count: Option<i64>,
    pub offset: Option<i64>,
}

/// Parameters for embedding similarity search.
#[derive(Clone, Debug)]
pub struct SearchMemoriesParams {
    pub table_name: String,
    /// Query vector; length must match the adapter's active dimension.
    pub embedding: Vec<f32>,
    pub room_id: Option<Uuid>,
    pub world_id: Option<Uuid>,
    pub entity_id: Option<Uuid>,
    /// Maximum cosine distance for a row to be returned. Defaults to 0.3.
    pub match_threshold: Option<f64>,
    /// Result-count limit. Defaults to 10.
    pub count: Option<i64>,
    /// Restrict to memories flagged unique.
    pub unique: bool,
}

#[derive(Clone, Debug)]
pub struct CreateRelationshipParams {
    pub source_entity_id: Uuid,
    pub target_entity_id: Uuid,
    pub tags: Vec<String>,
    pub metadata: Value,
}

#[derive(Clone, Debug, Default)]
pub struct GetTasksParams {
    pub room_id: Option<Uuid>,
    pub entity_id: Option<Uuid>,
    /// Tasks must carry every listed tag.
    pub tags: Option<Vec<String>>,
}

#[derive(Clone, Debug)]
pub struct LogParams {
    pub entity_id: Uuid,
    pub room_id: Option<Uuid>,
    pub log_type: String,
    pub body: Value,
}

#[derive(Clone, Debug, Default)]
pub struct GetLogsParams {
    pub entity_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub log_type: Option<String>,
    pub count: Option<i64>,
    pub offset: Option<i64>,
}

// =============================================================================
// Metadata shape validation
// =============================================================================

/// Check a memory's metadata shape against its type discriminator before
/// it is persisted.
///
/// Documents must carry a `timestamp`; fragments must reference a parent
/// `documentId` and a `position`. The discriminator is taken from
/// `metadata.type` when present, falling back to the logical table name.
pub fn validate_memory_metadata(table_name: &str, metadata: &Value) -> Result<()> {
    let declared = metadata.get("type").and_then(Value::as_str);
    let kind = declared.or(match table_name {
        "documents" => Some("document"),
        "fragments" => Some("fragment"),
        "messages" => Some("message"),
        _ => None,
    });

    match kind {
        Some("document") => {
            if metadata.get("timestamp").map_or(true, Value::is_null) {
                return Err(AdapterError::validation(
                    "document memory metadata requires a timestamp",
                ));
            }
        }
        Some("fragment") => {
            let document_id = metadata.get("documentId").and_then(Value::as_str);
            if document_id.map_or(true, |s| Uuid::parse_str(s).is_err()) {
                return Err(AdapterError::validation(
                    "fragment memory metadata requires a documentId referencing the parent document",
                ));
            }
            if metadata.get("position").and_then(Value::as_i64).is_none() {
                return Err(AdapterError::validation(
                    "fragment memory metadata requires a position",
                ));
            }
        }
        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_without_timestamp_is_rejected() {
        let err = validate_memory_metadata("documents", &json!({})).unwrap_err();
        assert!(matches!(err, AdapterError::Validation(_)));
    }

    #[test]
    fn document_with_timestamp_passes() {
        let meta = json!({ "type": "document", "timestamp": 1_721_000_000_000_i64 });
        validate_memory_metadata("documents", &meta).unwrap();
    }

    #[test]
    fn fragment_requires_parent_and_position() {
        let doc_id = Uuid::new_v4().to_string();

        let missing_position = json!({ "type": "fragment", "documentId": doc_id });
        assert!(validate_memory_metadata("fragments", &missing_position).is_err());

        let missing_parent = json!({ "type": "fragment", "position": 0 });
        assert!(validate_memory_metadata("fragments", &missing_parent).is_err());

        let complete = json!({ "type": "fragment", "documentId": doc_id, "position": 3 });
        validate_memory_metadata("fragments", &complete).unwrap();
    }

    #[test]
    fn fragment_parent_must_be_a_uuid() {
        let meta = json!({ "type": "fragment", "documentId": "not-a-uuid", "position": 0 });
        assert!(validate_memory_metadata("fragments", &meta).is_err());
    }

    #[test]
    fn messages_have_no_required_fields() {
        validate_memory_metadata("messages", &json!({})).unwrap();
        validate_memory_metadata("custom_table", &json!({ "anything": true })).unwrap();
    }

    #[test]
    fn declared_type_wins_over_table_name() {
        // A document stored in a custom table is still validated as one.
        let meta = json!({ "type": "document" });
        assert!(validate_memory_metadata("knowledge", &meta).is_err());
    }

    #[test]
    fn channel_type_round_trips() {
        for ct in [
            ChannelType::Dm,
            ChannelType::Group,
            ChannelType::Voice,
            ChannelType::Feed,
            ChannelType::Thread,
            ChannelType::World,
        ] {
            assert_eq!(ChannelType::parse(ct.as_str()), ct);
        }
    }
}
