//! The adapter contract and its backend-generic implementation.
//!
//! [`DatabaseAdapter`] is the full persistence surface the runtime programs
//! against. [`BaseAdapter`] implements it once over any [`Backend`]: every
//! operation is portable SQL with `?` placeholders and [`SqlValue`]
//! parameters, funneled through retry-wrapped helpers so transient
//! connection failures are absorbed uniformly. Backends only contribute
//! binding, dialect, and vector quirks.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::backend::{Backend, DatabaseConnection, SqlRow, SqlValue, Statement, VectorSearchQuery};
use crate::error::{AdapterError, Result};
use crate::retry::RetryPolicy;
use crate::schema;
use crate::schema::embedding::EmbeddingDimension;
use crate::schema::memory::MEMORY_COLUMNS;
use crate::types::{
    validate_memory_metadata, Agent, CreateRelationshipParams, Entity, GetLogsParams,
    GetMemoriesParams, GetTasksParams, LogEntry, LogParams, Memory, Participant, Relationship,
    Room, SearchMemoriesParams, Task, World,
};

const DEFAULT_MATCH_THRESHOLD: f64 = 0.3;
const DEFAULT_SEARCH_COUNT: i64 = 10;

/// The persistence contract. Object safe; the runtime holds an
/// `Arc<dyn DatabaseAdapter>` and never sees the backend behind it.
///
/// All record operations are implicitly scoped to the owning agent.
#[async_trait]
pub trait DatabaseAdapter: Send + Sync {
    // --- lifecycle ---

    /// Prepare the adapter for traffic. Idempotent.
    async fn init(&self) -> Result<()>;

    /// Apply pending schema migrations.
    async fn run_migrations(&self) -> Result<()>;

    /// Liveness probe.
    async fn is_ready(&self) -> Result<bool>;

    /// Begin graceful shutdown. Idempotent; operations issued afterwards
    /// fail with [`AdapterError::ShuttingDown`].
    async fn close(&self) -> Result<()>;

    /// The raw pool handle, for callers that need driver-level access.
    fn get_connection(&self) -> Result<DatabaseConnection>;

    /// The agent every operation is scoped to.
    fn agent_id(&self) -> Uuid;

    /// The active embedding dimension, in components.
    fn embedding_dimension(&self) -> usize;

    /// Switch the active embedding dimension. Fails for unsupported sizes.
    fn ensure_embedding_dimension(&self, size: usize) -> Result<()>;

    // --- agents ---

    async fn create_agent(&self, agent: &Agent) -> Result<()>;
    async fn get_agent(&self, agent_id: Uuid) -> Result<Option<Agent>>;
    async fn get_agents(&self) -> Result<Vec<Agent>>;
    async fn update_agent(&self, agent: &Agent) -> Result<bool>;
    async fn delete_agent(&self, agent_id: Uuid) -> Result<bool>;

    // --- entities ---

    async fn create_entities(&self, entities: &[Entity]) -> Result<()>;
    async fn get_entities_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Entity>>;
    async fn get_entities_for_room(&self, room_id: Uuid) -> Result<Vec<Entity>>;
    async fn update_entity(&self, entity: &Entity) -> Result<bool>;
    async fn delete_entity(&self, entity_id: Uuid) -> Result<bool>;

    // --- worlds ---

    async fn create_world(&self, world: &World) -> Result<Uuid>;
    async fn get_world(&self, world_id: Uuid) -> Result<Option<World>>;
    async fn get_all_worlds(&self) -> Result<Vec<World>>;
    async fn update_world(&self, world: &World) -> Result<bool>;
    async fn remove_world(&self, world_id: Uuid) -> Result<bool>;

    // --- rooms ---

    /// Create rooms, skipping ids that already exist. Returns the ids.
    async fn create_rooms(&self, rooms: &[Room]) -> Result<Vec<Uuid>>;
    async fn get_rooms_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Room>>;
    async fn get_rooms_by_world(&self, world_id: Uuid) -> Result<Vec<Room>>;
    async fn update_room(&self, room: &Room) -> Result<bool>;
    async fn delete_room(&self, room_id: Uuid) -> Result<bool>;
    async fn delete_rooms_by_world_id(&self, world_id: Uuid) -> Result<u64>;

    // --- participants ---

    /// Add entities to a room, skipping pairs already present.
    async fn add_participants_room(&self, entity_ids: &[Uuid], room_id: Uuid) -> Result<()>;
    async fn remove_participant(&self, entity_id: Uuid, room_id: Uuid) -> Result<bool>;
    /// Entity ids of a room's participants.
    async fn get_participants_for_room(&self, room_id: Uuid) -> Result<Vec<Uuid>>;
    /// Room ids an entity participates in.
    async fn get_rooms_for_participant(&self, entity_id: Uuid) -> Result<Vec<Uuid>>;
    async fn get_participant_user_state(
        &self,
        room_id: Uuid,
        entity_id: Uuid,
    ) -> Result<Option<String>>;
    async fn set_participant_user_state(
        &self,
        room_id: Uuid,
        entity_id: Uuid,
        state: Option<String>,
    ) -> Result<()>;

    // --- memories ---

    /// Persist a memory (and its embedding, atomically) under a logical
    /// table name. Metadata shape and embedding length are validated
    /// before anything touches the database. Returns the memory id; an id
    /// that already exists is left untouched.
    async fn create_memory(&self, memory: &Memory, table_name: &str) -> Result<Uuid>;
    /// Fetch one memory with its stored embedding, if any.
    async fn get_memory_by_id(&self, memory_id: Uuid) -> Result<Option<Memory>>;
    async fn get_memories_by_ids(&self, ids: &[Uuid], table_name: &str) -> Result<Vec<Memory>>;
    /// Filtered listing, newest first. Embeddings are not loaded.
    async fn get_memories(&self, params: &GetMemoriesParams) -> Result<Vec<Memory>>;
    async fn get_memories_by_room_ids(
        &self,
        table_name: &str,
        room_ids: &[Uuid],
        count: Option<i64>,
    ) -> Result<Vec<Memory>>;
    async fn get_memories_by_world_id(
        &self,
        table_name: &str,
        world_id: Uuid,
        count: Option<i64>,
    ) -> Result<Vec<Memory>>;
    /// Similarity search over the active dimension, nearest first. Each
    /// result carries `similarity = 1 - cosine distance`.
    async fn search_memories(&self, params: &SearchMemoriesParams) -> Result<Vec<Memory>>;
    /// Update content and metadata, and the embedding when one is given.
    async fn update_memory(&self, memory: &Memory) -> Result<bool>;
    async fn delete_memory(&self, memory_id: Uuid) -> Result<bool>;
    async fn delete_many_memories(&self, memory_ids: &[Uuid]) -> Result<u64>;
    async fn delete_all_memories(&self, room_id: Uuid, table_name: &str) -> Result<u64>;
    async fn count_memories(
        &self,
        room_id: Uuid,
        unique_only: bool,
        table_name: &str,
    ) -> Result<i64>;

    // --- relationships ---

    /// Create a directed edge. A duplicate (source, target) pair for this
    /// agent fails with [`AdapterError::Constraint`].
    async fn create_relationship(&self, params: &CreateRelationshipParams)
        -> Result<Relationship>;
    async fn update_relationship(&self, relationship: &Relationship) -> Result<bool>;
    async fn get_relationship(
        &self,
        source_entity_id: Uuid,
        target_entity_id: Uuid,
    ) -> Result<Option<Relationship>>;
    /// Edges touching an entity in either direction, optionally restricted
    /// to those carrying every listed tag.
    async fn get_relationships(
        &self,
        entity_id: Uuid,
        tags: Option<&[String]>,
    ) -> Result<Vec<Relationship>>;

    // --- tasks ---

    async fn create_task(&self, task: &Task) -> Result<Uuid>;
    async fn get_task(&self, task_id: Uuid) -> Result<Option<Task>>;
    async fn get_tasks(&self, params: &GetTasksParams) -> Result<Vec<Task>>;
    async fn get_tasks_by_name(&self, name: &str) -> Result<Vec<Task>>;
    async fn update_task(&self, task: &Task) -> Result<bool>;
    async fn delete_task(&self, task_id: Uuid) -> Result<bool>;

    // --- cache ---

    /// Read a cached value. Expired entries are dropped and read as absent.
    async fn get_cache(&self, key: &str) -> Result<Option<Value>>;
    /// Upsert a cached value with an optional absolute expiry.
    async fn set_cache(
        &self,
        key: &str,
        value: Value,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()>;
    async fn delete_cache(&self, key: &str) -> Result<bool>;

    // --- logs ---

    async fn log(&self, params: &LogParams) -> Result<()>;
    async fn get_logs(&self, params: &GetLogsParams) -> Result<Vec<LogEntry>>;
    async fn delete_log(&self, log_id: Uuid) -> Result<bool>;
}

/// Backend-generic adapter. All operations live here, written once; the
/// backend supplies dialect and vector behavior.
pub struct BaseAdapter<E: Backend> {
    backend: E,
    agent_id: Uuid,
    dimension: RwLock<EmbeddingDimension>,
    retry: RetryPolicy,
}

impl<E: Backend> BaseAdapter<E> {
    pub fn new(backend: E, agent_id: Uuid) -> Self {
        Self {
            backend,
            agent_id,
            dimension: RwLock::new(EmbeddingDimension::default()),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn backend(&self) -> &E {
        &self.backend
    }

    fn active_dimension(&self) -> EmbeddingDimension {
        *self.dimension.read().unwrap_or_else(|e| e.into_inner())
    }

    // Retry-wrapped funnels. Every data operation goes through one of
    // these, so transient failures are handled in exactly one place.

    async fn execute(&self, sql: &str, params: Vec<SqlValue>) -> Result<u64> {
        self.retry.execute(|| self.backend.execute(sql, &params)).await
    }

    async fn fetch_all(&self, sql: &str, params: Vec<SqlValue>) -> Result<Vec<SqlRow>> {
        self.retry.execute(|| self.backend.fetch_all(sql, &params)).await
    }

    async fn fetch_optional(&self, sql: &str, params: Vec<SqlValue>) -> Result<Option<SqlRow>> {
        let rows = self.fetch_all(sql, params).await?;
        Ok(rows.into_iter().next())
    }

    async fn run_transaction(&self, statements: Vec<Statement>) -> Result<()> {
        self.retry
            .execute(|| self.backend.execute_transaction(&statements))
            .await
    }

    async fn search(&self, query: VectorSearchQuery) -> Result<Vec<SqlRow>> {
        self.retry.execute(|| self.backend.search_embeddings(&query)).await
    }

    fn check_embedding_len(&self, embedding: &[f32]) -> Result<EmbeddingDimension> {
        let active = self.active_dimension();
        if embedding.len() != active.size() {
            return Err(AdapterError::validation(format!(
                "embedding has {} components but the active dimension is {}",
                embedding.len(),
                active.size()
            )));
        }
        Ok(active)
    }
}

/// `?, ?, ...` for an IN list of `n` values.
fn placeholders(n: usize) -> String {
    let mut out = String::with_capacity(n * 3);
    for i in 0..n {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('?');
    }
    out
}

fn json_array(strings: &[String]) -> Value {
    Value::Array(strings.iter().cloned().map(Value::String).collect())
}

/// Append LIMIT/OFFSET clauses. SQLite requires a LIMIT whenever an
/// OFFSET is present, so an offset without a count gets an unbounded one.
fn push_limit_offset(
    sql: &mut String,
    bind: &mut Vec<SqlValue>,
    count: Option<i64>,
    offset: Option<i64>,
) {
    if count.is_some() || offset.is_some() {
        sql.push_str(" LIMIT ?");
        bind.push(SqlValue::I64(count.unwrap_or(i64::MAX)));
    }
    if let Some(offset) = offset {
        sql.push_str(" OFFSET ?");
        bind.push(SqlValue::I64(offset));
    }
}

#[async_trait]
impl<E: Backend> DatabaseAdapter for BaseAdapter<E> {
    async fn init(&self) -> Result<()> {
        self.backend.init().await
    }

    async fn run_migrations(&self) -> Result<()> {
        self.backend.run_migrations().await
    }

    async fn is_ready(&self) -> Result<bool> {
        self.backend.is_ready().await
    }

    async fn close(&self) -> Result<()> {
        self.backend.close().await
    }

    fn get_connection(&self) -> Result<DatabaseConnection> {
        self.backend.connection()
    }

    fn agent_id(&self) -> Uuid {
        self.agent_id
    }

    fn embedding_dimension(&self) -> usize {
        self.active_dimension().size()
    }

    fn ensure_embedding_dimension(&self, size: usize) -> Result<()> {
        let dimension = EmbeddingDimension::from_size(size)?;
        let mut active = self.dimension.write().unwrap_or_else(|e| e.into_inner());
        if *active != dimension {
            debug!(from = active.size(), to = dimension.size(), "switching embedding dimension");
            *active = dimension;
        }
        Ok(())
    }

    // --- agents ---

    async fn create_agent(&self, agent: &Agent) -> Result<()> {
        let now = Utc::now();
        self.execute(
            "INSERT INTO agents (id, name, settings, enabled, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
            vec![
                SqlValue::Uuid(agent.id),
                SqlValue::Text(agent.name.clone()),
                SqlValue::Json(agent.settings.clone()),
                SqlValue::Bool(agent.enabled),
                SqlValue::Timestamp(agent.created_at.unwrap_or(now)),
                SqlValue::Timestamp(agent.updated_at.unwrap_or(now)),
            ],
        )
        .await?;
        Ok(())
    }

    async fn get_agent(&self, agent_id: Uuid) -> Result<Option<Agent>> {
        let row = self
            .fetch_optional(
                "SELECT id, name, settings, enabled, created_at, updated_at \
                 FROM agents WHERE id = ?",
                vec![SqlValue::Uuid(agent_id)],
            )
            .await?;
        row.as_ref().map(schema::agent::agent_from_row).transpose()
    }

    async fn get_agents(&self) -> Result<Vec<Agent>> {
        let rows = self
            .fetch_all(
                "SELECT id, name, settings, enabled, created_at, updated_at \
                 FROM agents ORDER BY created_at",
                Vec::new(),
            )
            .await?;
        rows.iter().map(schema::agent::agent_from_row).collect()
    }

    async fn update_agent(&self, agent: &Agent) -> Result<bool> {
        let affected = self
            .execute(
                "UPDATE agents SET name = ?, settings = ?, enabled = ?, updated_at = ? \
                 WHERE id = ?",
                vec![
                    SqlValue::Text(agent.name.clone()),
                    SqlValue::Json(agent.settings.clone()),
                    SqlValue::Bool(agent.enabled),
                    SqlValue::Timestamp(Utc::now()),
                    SqlValue::Uuid(agent.id),
                ],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn delete_agent(&self, agent_id: Uuid) -> Result<bool> {
        let affected = self
            .execute("DELETE FROM agents WHERE id = ?", vec![SqlValue::Uuid(agent_id)])
            .await?;
        Ok(affected > 0)
    }

    // --- entities ---

    async fn create_entities(&self, entities: &[Entity]) -> Result<()> {
        if entities.is_empty() {
            return Ok(());
        }
        let now = Utc::now();
        let statements: Vec<Statement> = entities
            .iter()
            .map(|entity| {
                (
                    "INSERT INTO entities (id, agent_id, names, metadata, created_at) \
                     VALUES (?, ?, ?, ?, ?)"
                        .to_string(),
                    vec![
                        SqlValue::Uuid(entity.id),
                        SqlValue::Uuid(self.agent_id),
                        SqlValue::Json(json_array(&entity.names)),
                        SqlValue::Json(entity.metadata.clone()),
                        SqlValue::Timestamp(entity.created_at.unwrap_or(now)),
                    ],
                )
            })
            .collect();
        self.run_transaction(statements).await
    }

    async fn get_entities_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Entity>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, agent_id, names, metadata, created_at FROM entities \
             WHERE agent_id = ? AND id IN ({})",
            placeholders(ids.len())
        );
        let mut params = vec![SqlValue::Uuid(self.agent_id)];
        params.extend(ids.iter().map(|id| SqlValue::Uuid(*id)));
        let rows = self.fetch_all(&sql, params).await?;
        rows.iter().map(schema::entity::entity_from_row).collect()
    }

    async fn get_entities_for_room(&self, room_id: Uuid) -> Result<Vec<Entity>> {
        let rows = self
            .fetch_all(
                "SELECT e.id, e.agent_id, e.names, e.metadata, e.created_at \
                 FROM entities e JOIN participants p ON p.entity_id = e.id \
                 WHERE p.room_id = ? AND e.agent_id = ?",
                vec![SqlValue::Uuid(room_id), SqlValue::Uuid(self.agent_id)],
            )
            .await?;
        rows.iter().map(schema::entity::entity_from_row).collect()
    }

    async fn update_entity(&self, entity: &Entity) -> Result<bool> {
        let affected = self
            .execute(
                "UPDATE entities SET names = ?, metadata = ? WHERE id = ? AND agent_id = ?",
                vec![
                    SqlValue::Json(json_array(&entity.names)),
                    SqlValue::Json(entity.metadata.clone()),
                    SqlValue::Uuid(entity.id),
                    SqlValue::Uuid(self.agent_id),
                ],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn delete_entity(&self, entity_id: Uuid) -> Result<bool> {
        let affected = self
            .execute(
                "DELETE FROM entities WHERE id = ? AND agent_id = ?",
                vec![SqlValue::Uuid(entity_id), SqlValue::Uuid(self.agent_id)],
            )
            .await?;
        Ok(affected > 0)
    }

    // --- worlds ---

    async fn create_world(&self, world: &World) -> Result<Uuid> {
        self.execute(
            "INSERT INTO worlds (id, agent_id, name, server_id, metadata, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
            vec![
                SqlValue::Uuid(world.id),
                SqlValue::Uuid(self.agent_id),
                SqlValue::Text(world.name.clone()),
                SqlValue::TextOpt(world.server_id.clone()),
                SqlValue::Json(world.metadata.clone()),
                SqlValue::Timestamp(world.created_at.unwrap_or_else(Utc::now)),
            ],
        )
        .await?;
        Ok(world.id)
    }

    async fn get_world(&self, world_id: Uuid) -> Result<Option<World>> {
        let row = self
            .fetch_optional(
                "SELECT id, agent_id, name, server_id, metadata, created_at \
                 FROM worlds WHERE id = ? AND agent_id = ?",
                vec![SqlValue::Uuid(world_id), SqlValue::Uuid(self.agent_id)],
            )
            .await?;
        row.as_ref().map(schema::world::world_from_row).transpose()
    }

    async fn get_all_worlds(&self) -> Result<Vec<World>> {
        let rows = self
            .fetch_all(
                "SELECT id, agent_id, name, server_id, metadata, created_at \
                 FROM worlds WHERE agent_id = ? ORDER BY created_at",
                vec![SqlValue::Uuid(self.agent_id)],
            )
            .await?;
        rows.iter().map(schema::world::world_from_row).collect()
    }

    async fn update_world(&self, world: &World) -> Result<bool> {
        let affected = self
            .execute(
                "UPDATE worlds SET name = ?, server_id = ?, metadata = ? \
                 WHERE id = ? AND agent_id = ?",
                vec![
                    SqlValue::Text(world.name.clone()),
                    SqlValue::TextOpt(world.server_id.clone()),
                    SqlValue::Json(world.metadata.clone()),
                    SqlValue::Uuid(world.id),
                    SqlValue::Uuid(self.agent_id),
                ],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn remove_world(&self, world_id: Uuid) -> Result<bool> {
        let affected = self
            .execute(
                "DELETE FROM worlds WHERE id = ? AND agent_id = ?",
                vec![SqlValue::Uuid(world_id), SqlValue::Uuid(self.agent_id)],
            )
            .await?;
        Ok(affected > 0)
    }

    // --- rooms ---

    async fn create_rooms(&self, rooms: &[Room]) -> Result<Vec<Uuid>> {
        if rooms.is_empty() {
            return Ok(Vec::new());
        }
        let now = Utc::now();
        let statements: Vec<Statement> = rooms
            .iter()
            .map(|room| {
                (
                    "INSERT INTO rooms \
                     (id, agent_id, name, source, type, channel_id, world_id, metadata, created_at) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) ON CONFLICT (id) DO NOTHING"
                        .to_string(),
                    vec![
                        SqlValue::Uuid(room.id),
                        SqlValue::Uuid(self.agent_id),
                        SqlValue::TextOpt(room.name.clone()),
                        SqlValue::Text(room.source.clone()),
                        SqlValue::Text(room.room_type.as_str().to_string()),
                        SqlValue::TextOpt(room.channel_id.clone()),
                        SqlValue::UuidOpt(room.world_id),
                        SqlValue::Json(room.metadata.clone()),
                        SqlValue::Timestamp(room.created_at.unwrap_or(now)),
                    ],
                )
            })
            .collect();
        self.run_transaction(statements).await?;
        Ok(rooms.iter().map(|room| room.id).collect())
    }

    async fn get_rooms_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Room>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, agent_id, name, source, type, channel_id, world_id, metadata, created_at \
             FROM rooms WHERE agent_id = ? AND id IN ({})",
            placeholders(ids.len())
        );
        let mut params = vec![SqlValue::Uuid(self.agent_id)];
        params.extend(ids.iter().map(|id| SqlValue::Uuid(*id)));
        let rows = self.fetch_all(&sql, params).await?;
        rows.iter().map(schema::room::room_from_row).collect()
    }

    async fn get_rooms_by_world(&self, world_id: Uuid) -> Result<Vec<Room>> {
        let rows = self
            .fetch_all(
                "SELECT id, agent_id, name, source, type, channel_id, world_id, metadata, created_at \
                 FROM rooms WHERE world_id = ? AND agent_id = ?",
                vec![SqlValue::Uuid(world_id), SqlValue::Uuid(self.agent_id)],
            )
            .await?;
        rows.iter().map(schema::room::room_from_row).collect()
    }

    async fn update_room(&self, room: &Room) -> Result<bool> {
        let affected = self
            .execute(
                "UPDATE rooms SET name = ?, source = ?, type = ?, channel_id = ?, \
                 world_id = ?, metadata = ? WHERE id = ? AND agent_id = ?",
                vec![
                    SqlValue::TextOpt(room.name.clone()),
                    SqlValue::Text(room.source.clone()),
                    SqlValue::Text(room.room_type.as_str().to_string()),
                    SqlValue::TextOpt(room.channel_id.clone()),
                    SqlValue::UuidOpt(room.world_id),
                    SqlValue::Json(room.metadata.clone()),
                    SqlValue::Uuid(room.id),
                    SqlValue::Uuid(self.agent_id),
                ],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn delete_room(&self, room_id: Uuid) -> Result<bool> {
        let affected = self
            .execute(
                "DELETE FROM rooms WHERE id = ? AND agent_id = ?",
                vec![SqlValue::Uuid(room_id), SqlValue::Uuid(self.agent_id)],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn delete_rooms_by_world_id(&self, world_id: Uuid) -> Result<u64> {
        self.execute(
            "DELETE FROM rooms WHERE world_id = ? AND agent_id = ?",
            vec![SqlValue::Uuid(world_id), SqlValue::Uuid(self.agent_id)],
        )
        .await
    }

    // --- participants ---

    async fn add_participants_room(&self, entity_ids: &[Uuid], room_id: Uuid) -> Result<()> {
        if entity_ids.is_empty() {
            return Ok(());
        }
        let now = Utc::now();
        let statements: Vec<Statement> = entity_ids
            .iter()
            .map(|entity_id| {
                (
                    "INSERT INTO participants (id, entity_id, room_id, created_at) \
                     VALUES (?, ?, ?, ?) ON CONFLICT (entity_id, room_id) DO NOTHING"
                        .to_string(),
                    vec![
                        SqlValue::Uuid(Uuid::new_v4()),
                        SqlValue::Uuid(*entity_id),
                        SqlValue::Uuid(room_id),
                        SqlValue::Timestamp(now),
                    ],
                )
            })
            .collect();
        self.run_transaction(statements).await
    }

    async fn remove_participant(&self, entity_id: Uuid, room_id: Uuid) -> Result<bool> {
        let affected = self
            .execute(
                "DELETE FROM participants WHERE entity_id = ? AND room_id = ?",
                vec![SqlValue::Uuid(entity_id), SqlValue::Uuid(room_id)],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn get_participants_for_room(&self, room_id: Uuid) -> Result<Vec<Uuid>> {
        let rows = self
            .fetch_all(
                "SELECT id, entity_id, room_id, user_state, created_at \
                 FROM participants WHERE room_id = ?",
                vec![SqlValue::Uuid(room_id)],
            )
            .await?;
        let participants: Result<Vec<Participant>> = rows
            .iter()
            .map(schema::participant::participant_from_row)
            .collect();
        Ok(participants?.into_iter().map(|p| p.entity_id).collect())
    }

    async fn get_rooms_for_participant(&self, entity_id: Uuid) -> Result<Vec<Uuid>> {
        let rows = self
            .fetch_all(
                "SELECT id, entity_id, room_id, user_state, created_at \
                 FROM participants WHERE entity_id = ?",
                vec![SqlValue::Uuid(entity_id)],
            )
            .await?;
        let participants: Result<Vec<Participant>> = rows
            .iter()
            .map(schema::participant::participant_from_row)
            .collect();
        Ok(participants?.into_iter().map(|p| p.room_id).collect())
    }

    async fn get_participant_user_state(
        &self,
        room_id: Uuid,
        entity_id: Uuid,
    ) -> Result<Option<String>> {
        let row = self
            .fetch_optional(
                "SELECT id, entity_id, room_id, user_state, created_at \
                 FROM participants WHERE room_id = ? AND entity_id = ?",
                vec![SqlValue::Uuid(room_id), SqlValue::Uuid(entity_id)],
            )
            .await?;
        match row {
            Some(row) => {
                Ok(schema::participant::participant_from_row(&row)?.user_state)
            }
            None => Ok(None),
        }
    }

    async fn set_participant_user_state(
        &self,
        room_id: Uuid,
        entity_id: Uuid,
        state: Option<String>,
    ) -> Result<()> {
        self.execute(
            "UPDATE participants SET user_state = ? WHERE room_id = ? AND entity_id = ?",
            vec![
                SqlValue::TextOpt(state),
                SqlValue::Uuid(room_id),
                SqlValue::Uuid(entity_id),
            ],
        )
        .await?;
        Ok(())
    }

    // --- memories ---

    async fn create_memory(&self, memory: &Memory, table_name: &str) -> Result<Uuid> {
        validate_memory_metadata(table_name, &memory.metadata)?;

        let memory_id = memory.id.unwrap_or_else(Uuid::new_v4);
        let created_at = memory.created_at.unwrap_or_else(Utc::now);

        // An id that already exists is left untouched, embedding included.
        let existing = self
            .fetch_optional(
                "SELECT id FROM memories WHERE id = ? AND agent_id = ?",
                vec![SqlValue::Uuid(memory_id), SqlValue::Uuid(self.agent_id)],
            )
            .await?;
        if existing.is_some() {
            return Ok(memory_id);
        }

        let mut statements: Vec<Statement> = vec![(
            format!(
                "INSERT INTO memories ({MEMORY_COLUMNS}) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) ON CONFLICT (id) DO NOTHING"
            ),
            vec![
                SqlValue::Uuid(memory_id),
                SqlValue::Text(table_name.to_string()),
                SqlValue::Uuid(memory.entity_id),
                SqlValue::Uuid(self.agent_id),
                SqlValue::Uuid(memory.room_id),
                SqlValue::UuidOpt(memory.world_id),
                SqlValue::Json(memory.content.clone()),
                SqlValue::Bool(memory.unique),
                SqlValue::Json(memory.metadata.clone()),
                SqlValue::Timestamp(created_at),
            ],
        )];

        if let Some(embedding) = &memory.embedding {
            let dimension = self.check_embedding_len(embedding)?;
            statements.push(self.backend.embedding_upsert(
                Uuid::new_v4(),
                memory_id,
                dimension,
                embedding,
                created_at,
            ));
        }

        self.run_transaction(statements).await?;
        Ok(memory_id)
    }

    async fn get_memory_by_id(&self, memory_id: Uuid) -> Result<Option<Memory>> {
        let row = self
            .fetch_optional(
                &format!(
                    "SELECT {MEMORY_COLUMNS} FROM memories WHERE id = ? AND agent_id = ?"
                ),
                vec![SqlValue::Uuid(memory_id), SqlValue::Uuid(self.agent_id)],
            )
            .await?;
        let Some(row) = row else { return Ok(None) };
        let mut memory = schema::memory::memory_from_row(&row)?;
        memory.embedding = self
            .backend
            .fetch_embedding(memory_id, self.active_dimension())
            .await?;
        Ok(Some(memory))
    }

    async fn get_memories_by_ids(&self, ids: &[Uuid], table_name: &str) -> Result<Vec<Memory>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {MEMORY_COLUMNS} FROM memories \
             WHERE agent_id = ? AND type = ? AND id IN ({}) ORDER BY created_at DESC",
            placeholders(ids.len())
        );
        let mut params = vec![
            SqlValue::Uuid(self.agent_id),
            SqlValue::Text(table_name.to_string()),
        ];
        params.extend(ids.iter().map(|id| SqlValue::Uuid(*id)));
        let rows = self.fetch_all(&sql, params).await?;
        rows.iter().map(schema::memory::memory_from_row).collect()
    }

    async fn get_memories(&self, params: &GetMemoriesParams) -> Result<Vec<Memory>> {
        if params.table_name.is_empty() {
            return Err(AdapterError::validation("get_memories requires a table name"));
        }

        let mut sql = format!(
            "SELECT {MEMORY_COLUMNS} FROM memories WHERE agent_id = ? AND type = ?"
        );
        let mut bind = vec![
            SqlValue::Uuid(self.agent_id),
            SqlValue::Text(params.table_name.clone()),
        ];
        if let Some(room_id) = params.room_id {
            sql.push_str(" AND room_id = ?");
            bind.push(SqlValue::Uuid(room_id));
        }
        if let Some(world_id) = params.world_id {
            sql.push_str(" AND world_id = ?");
            bind.push(SqlValue::Uuid(world_id));
        }
        if let Some(entity_id) = params.entity_id {
            sql.push_str(" AND entity_id = ?");
            bind.push(SqlValue::Uuid(entity_id));
        }
        if params.unique {
            sql.push_str(" AND \"unique\" = ?");
            bind.push(SqlValue::Bool(true));
        }
        if let Some(start) = params.start {
            sql.push_str(" AND created_at >= ?");
            bind.push(SqlValue::Timestamp(start));
        }
        if let Some(end) = params.end {
            sql.push_str(" AND created_at <= ?");
            bind.push(SqlValue::Timestamp(end));
        }
        sql.push_str(" ORDER BY created_at DESC");
        push_limit_offset(&mut sql, &mut bind, params.count, params.offset);

        let rows = self.fetch_all(&sql, bind).await?;
        rows.iter().map(schema::memory::memory_from_row).collect()
    }

    async fn get_memories_by_room_ids(
        &self,
        table_name: &str,
        room_ids: &[Uuid],
        count: Option<i64>,
    ) -> Result<Vec<Memory>> {
        if room_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut sql = format!(
            "SELECT {MEMORY_COLUMNS} FROM memories \
             WHERE agent_id = ? AND type = ? AND room_id IN ({}) ORDER BY created_at DESC",
            placeholders(room_ids.len())
        );
        let mut params = vec![
            SqlValue::Uuid(self.agent_id),
            SqlValue::Text(table_name.to_string()),
        ];
        params.extend(room_ids.iter().map(|id| SqlValue::Uuid(*id)));
        if let Some(count) = count {
            sql.push_str(" LIMIT ?");
            params.push(SqlValue::I64(count));
        }
        let rows = self.fetch_all(&sql, params).await?;
        rows.iter().map(schema::memory::memory_from_row).collect()
    }

    async fn get_memories_by_world_id(
        &self,
        table_name: &str,
        world_id: Uuid,
        count: Option<i64>,
    ) -> Result<Vec<Memory>> {
        let mut sql = format!(
            "SELECT {MEMORY_COLUMNS} FROM memories \
             WHERE agent_id = ? AND type = ? AND world_id = ? ORDER BY created_at DESC"
        );
        let mut params = vec![
            SqlValue::Uuid(self.agent_id),
            SqlValue::Text(table_name.to_string()),
            SqlValue::Uuid(world_id),
        ];
        if let Some(count) = count {
            sql.push_str(" LIMIT ?");
            params.push(SqlValue::I64(count));
        }
        let rows = self.fetch_all(&sql, params).await?;
        rows.iter().map(schema::memory::memory_from_row).collect()
    }

    async fn search_memories(&self, params: &SearchMemoriesParams) -> Result<Vec<Memory>> {
        let dimension = self.check_embedding_len(&params.embedding)?;
        let query = VectorSearchQuery {
            agent_id: self.agent_id,
            table_name: params.table_name.clone(),
            embedding: params.embedding.clone(),
            dimension,
            room_id: params.room_id,
            world_id: params.world_id,
            entity_id: params.entity_id,
            distance_threshold: params.match_threshold.unwrap_or(DEFAULT_MATCH_THRESHOLD),
            count: params.count.unwrap_or(DEFAULT_SEARCH_COUNT),
            unique_only: params.unique,
        };
        let rows = self.search(query).await?;
        rows.iter().map(schema::memory::memory_from_search_row).collect()
    }

    async fn update_memory(&self, memory: &Memory) -> Result<bool> {
        let Some(memory_id) = memory.id else {
            return Err(AdapterError::validation("update_memory requires a memory id"));
        };

        // Metadata must keep the shape its table demands; the stored type
        // column is the discriminator when the metadata omits one.
        let row = self
            .fetch_optional(
                "SELECT type FROM memories WHERE id = ? AND agent_id = ?",
                vec![SqlValue::Uuid(memory_id), SqlValue::Uuid(self.agent_id)],
            )
            .await?;
        let Some(row) = row else { return Ok(false) };
        let table_name = crate::backend::col_str(&row, "type")?;
        validate_memory_metadata(&table_name, &memory.metadata)?;

        let update: Statement = (
            "UPDATE memories SET content = ?, metadata = ? WHERE id = ? AND agent_id = ?"
                .to_string(),
            vec![
                SqlValue::Json(memory.content.clone()),
                SqlValue::Json(memory.metadata.clone()),
                SqlValue::Uuid(memory_id),
                SqlValue::Uuid(self.agent_id),
            ],
        );

        match &memory.embedding {
            Some(embedding) => {
                let dimension = self.check_embedding_len(embedding)?;
                let upsert = self.backend.embedding_upsert(
                    Uuid::new_v4(),
                    memory_id,
                    dimension,
                    embedding,
                    Utc::now(),
                );
                self.run_transaction(vec![update, upsert]).await?;
                Ok(true)
            }
            None => {
                let affected = self.execute(&update.0, update.1).await?;
                Ok(affected > 0)
            }
        }
    }

    async fn delete_memory(&self, memory_id: Uuid) -> Result<bool> {
        let affected = self
            .execute(
                "DELETE FROM memories WHERE id = ? AND agent_id = ?",
                vec![SqlValue::Uuid(memory_id), SqlValue::Uuid(self.agent_id)],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn delete_many_memories(&self, memory_ids: &[Uuid]) -> Result<u64> {
        if memory_ids.is_empty() {
            return Ok(0);
        }
        let sql = format!(
            "DELETE FROM memories WHERE agent_id = ? AND id IN ({})",
            placeholders(memory_ids.len())
        );
        let mut params = vec![SqlValue::Uuid(self.agent_id)];
        params.extend(memory_ids.iter().map(|id| SqlValue::Uuid(*id)));
        self.execute(&sql, params).await
    }

    async fn delete_all_memories(&self, room_id: Uuid, table_name: &str) -> Result<u64> {
        self.execute(
            "DELETE FROM memories WHERE agent_id = ? AND room_id = ? AND type = ?",
            vec![
                SqlValue::Uuid(self.agent_id),
                SqlValue::Uuid(room_id),
                SqlValue::Text(table_name.to_string()),
            ],
        )
        .await
    }

    async fn count_memories(
        &self,
        room_id: Uuid,
        unique_only: bool,
        table_name: &str,
    ) -> Result<i64> {
        let mut sql = "SELECT COUNT(*) AS total FROM memories \
                       WHERE agent_id = ? AND room_id = ? AND type = ?"
            .to_string();
        let mut params = vec![
            SqlValue::Uuid(self.agent_id),
            SqlValue::Uuid(room_id),
            SqlValue::Text(table_name.to_string()),
        ];
        if unique_only {
            sql.push_str(" AND \"unique\" = ?");
            params.push(SqlValue::Bool(true));
        }
        let row = self.fetch_optional(&sql, params).await?;
        match row {
            Some(row) => crate::backend::col_i64(&row, "total"),
            None => Ok(0),
        }
    }

    // --- relationships ---

    async fn create_relationship(
        &self,
        params: &CreateRelationshipParams,
    ) -> Result<Relationship> {
        let relationship = Relationship {
            id: Uuid::new_v4(),
            source_entity_id: params.source_entity_id,
            target_entity_id: params.target_entity_id,
            agent_id: self.agent_id,
            tags: params.tags.clone(),
            metadata: params.metadata.clone(),
            created_at: Some(Utc::now()),
        };
        // No conflict clause: a duplicate (source, target) pair must
        // surface as a constraint error.
        self.execute(
            "INSERT INTO relationships \
             (id, source_entity_id, target_entity_id, agent_id, tags, metadata, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            vec![
                SqlValue::Uuid(relationship.id),
                SqlValue::Uuid(relationship.source_entity_id),
                SqlValue::Uuid(relationship.target_entity_id),
                SqlValue::Uuid(self.agent_id),
                SqlValue::Json(json_array(&relationship.tags)),
                SqlValue::Json(relationship.metadata.clone()),
                SqlValue::Timestamp(relationship.created_at.unwrap_or_else(Utc::now)),
            ],
        )
        .await?;
        Ok(relationship)
    }

    async fn update_relationship(&self, relationship: &Relationship) -> Result<bool> {
        let affected = self
            .execute(
                "UPDATE relationships SET tags = ?, metadata = ? \
                 WHERE id = ? AND agent_id = ?",
                vec![
                    SqlValue::Json(json_array(&relationship.tags)),
                    SqlValue::Json(relationship.metadata.clone()),
                    SqlValue::Uuid(relationship.id),
                    SqlValue::Uuid(self.agent_id),
                ],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn get_relationship(
        &self,
        source_entity_id: Uuid,
        target_entity_id: Uuid,
    ) -> Result<Option<Relationship>> {
        let row = self
            .fetch_optional(
                "SELECT id, source_entity_id, target_entity_id, agent_id, tags, metadata, \
                 created_at FROM relationships \
                 WHERE source_entity_id = ? AND target_entity_id = ? AND agent_id = ?",
                vec![
                    SqlValue::Uuid(source_entity_id),
                    SqlValue::Uuid(target_entity_id),
                    SqlValue::Uuid(self.agent_id),
                ],
            )
            .await?;
        row.as_ref()
            .map(schema::relationship::relationship_from_row)
            .transpose()
    }

    async fn get_relationships(
        &self,
        entity_id: Uuid,
        tags: Option<&[String]>,
    ) -> Result<Vec<Relationship>> {
        let rows = self
            .fetch_all(
                "SELECT id, source_entity_id, target_entity_id, agent_id, tags, metadata, \
                 created_at FROM relationships \
                 WHERE agent_id = ? AND (source_entity_id = ? OR target_entity_id = ?)",
                vec![
                    SqlValue::Uuid(self.agent_id),
                    SqlValue::Uuid(entity_id),
                    SqlValue::Uuid(entity_id),
                ],
            )
            .await?;
        let mut relationships: Vec<Relationship> = rows
            .iter()
            .map(schema::relationship::relationship_from_row)
            .collect::<Result<_>>()?;
        if let Some(required) = tags {
            relationships.retain(|r| required.iter().all(|tag| r.tags.contains(tag)));
        }
        Ok(relationships)
    }

    // --- tasks ---

    async fn create_task(&self, task: &Task) -> Result<Uuid> {
        let task_id = task.id.unwrap_or_else(Uuid::new_v4);
        let now = Utc::now();
        self.execute(
            "INSERT INTO tasks \
             (id, agent_id, name, description, room_id, world_id, entity_id, tags, metadata, \
             created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            vec![
                SqlValue::Uuid(task_id),
                SqlValue::Uuid(self.agent_id),
                SqlValue::Text(task.name.clone()),
                SqlValue::TextOpt(task.description.clone()),
                SqlValue::UuidOpt(task.room_id),
                SqlValue::UuidOpt(task.world_id),
                SqlValue::UuidOpt(task.entity_id),
                SqlValue::Json(json_array(&task.tags)),
                SqlValue::Json(task.metadata.clone()),
                SqlValue::Timestamp(task.created_at.unwrap_or(now)),
                SqlValue::Timestamp(task.updated_at.unwrap_or(now)),
            ],
        )
        .await?;
        Ok(task_id)
    }

    async fn get_task(&self, task_id: Uuid) -> Result<Option<Task>> {
        let row = self
            .fetch_optional(
                "SELECT id, agent_id, name, description, room_id, world_id, entity_id, tags, \
                 metadata, created_at, updated_at FROM tasks WHERE id = ? AND agent_id = ?",
                vec![SqlValue::Uuid(task_id), SqlValue::Uuid(self.agent_id)],
            )
            .await?;
        row.as_ref().map(schema::task::task_from_row).transpose()
    }

    async fn get_tasks(&self, params: &GetTasksParams) -> Result<Vec<Task>> {
        let mut sql = "SELECT id, agent_id, name, description, room_id, world_id, entity_id, \
                       tags, metadata, created_at, updated_at FROM tasks WHERE agent_id = ?"
            .to_string();
        let mut bind = vec![SqlValue::Uuid(self.agent_id)];
        if let Some(room_id) = params.room_id {
            sql.push_str(" AND room_id = ?");
            bind.push(SqlValue::Uuid(room_id));
        }
        if let Some(entity_id) = params.entity_id {
            sql.push_str(" AND entity_id = ?");
            bind.push(SqlValue::Uuid(entity_id));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let rows = self.fetch_all(&sql, bind).await?;
        let mut tasks: Vec<Task> = rows
            .iter()
            .map(schema::task::task_from_row)
            .collect::<Result<_>>()?;
        // Tag containment is dialect-specific in SQL; filter here instead.
        if let Some(required) = &params.tags {
            tasks.retain(|t| required.iter().all(|tag| t.tags.contains(tag)));
        }
        Ok(tasks)
    }

    async fn get_tasks_by_name(&self, name: &str) -> Result<Vec<Task>> {
        let rows = self
            .fetch_all(
                "SELECT id, agent_id, name, description, room_id, world_id, entity_id, tags, \
                 metadata, created_at, updated_at FROM tasks \
                 WHERE agent_id = ? AND name = ? ORDER BY created_at DESC",
                vec![SqlValue::Uuid(self.agent_id), SqlValue::Text(name.to_string())],
            )
            .await?;
        rows.iter().map(schema::task::task_from_row).collect()
    }

    async fn update_task(&self, task: &Task) -> Result<bool> {
        let Some(task_id) = task.id else {
            return Err(AdapterError::validation("update_task requires a task id"));
        };
        let affected = self
            .execute(
                "UPDATE tasks SET name = ?, description = ?, room_id = ?, world_id = ?, \
                 entity_id = ?, tags = ?, metadata = ?, updated_at = ? \
                 WHERE id = ? AND agent_id = ?",
                vec![
                    SqlValue::Text(task.name.clone()),
                    SqlValue::TextOpt(task.description.clone()),
                    SqlValue::UuidOpt(task.room_id),
                    SqlValue::UuidOpt(task.world_id),
                    SqlValue::UuidOpt(task.entity_id),
                    SqlValue::Json(json_array(&task.tags)),
                    SqlValue::Json(task.metadata.clone()),
                    SqlValue::Timestamp(Utc::now()),
                    SqlValue::Uuid(task_id),
                    SqlValue::Uuid(self.agent_id),
                ],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn delete_task(&self, task_id: Uuid) -> Result<bool> {
        let affected = self
            .execute(
                "DELETE FROM tasks WHERE id = ? AND agent_id = ?",
                vec![SqlValue::Uuid(task_id), SqlValue::Uuid(self.agent_id)],
            )
            .await?;
        Ok(affected > 0)
    }

    // --- cache ---

    async fn get_cache(&self, key: &str) -> Result<Option<Value>> {
        let row = self
            .fetch_optional(
                "SELECT value, expires_at FROM cache WHERE key = ? AND agent_id = ?",
                vec![SqlValue::Text(key.to_string()), SqlValue::Uuid(self.agent_id)],
            )
            .await?;
        let Some(row) = row else { return Ok(None) };
        let entry = schema::cache::cache_from_row(&row)?;
        if let Some(expires_at) = entry.expires_at {
            if expires_at <= Utc::now() {
                self.delete_cache(key).await?;
                return Ok(None);
            }
        }
        Ok(Some(entry.value))
    }

    async fn set_cache(
        &self,
        key: &str,
        value: Value,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        self.execute(
            "INSERT INTO cache (key, agent_id, value, created_at, expires_at) \
             VALUES (?, ?, ?, ?, ?) ON CONFLICT (key, agent_id) DO UPDATE SET \
             value = excluded.value, created_at = excluded.created_at, \
             expires_at = excluded.expires_at",
            vec![
                SqlValue::Text(key.to_string()),
                SqlValue::Uuid(self.agent_id),
                SqlValue::Json(value),
                SqlValue::Timestamp(Utc::now()),
                SqlValue::TimestampOpt(expires_at),
            ],
        )
        .await?;
        Ok(())
    }

    async fn delete_cache(&self, key: &str) -> Result<bool> {
        let affected = self
            .execute(
                "DELETE FROM cache WHERE key = ? AND agent_id = ?",
                vec![SqlValue::Text(key.to_string()), SqlValue::Uuid(self.agent_id)],
            )
            .await?;
        Ok(affected > 0)
    }

    // --- logs ---

    async fn log(&self, params: &LogParams) -> Result<()> {
        self.execute(
            "INSERT INTO logs (id, entity_id, room_id, type, body, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
            vec![
                SqlValue::Uuid(Uuid::new_v4()),
                SqlValue::Uuid(params.entity_id),
                SqlValue::UuidOpt(params.room_id),
                SqlValue::Text(params.log_type.clone()),
                SqlValue::Json(params.body.clone()),
                SqlValue::Timestamp(Utc::now()),
            ],
        )
        .await?;
        Ok(())
    }

    async fn get_logs(&self, params: &GetLogsParams) -> Result<Vec<LogEntry>> {
        let mut sql =
            "SELECT id, entity_id, room_id, type, body, created_at FROM logs WHERE 1 = 1"
                .to_string();
        let mut bind = Vec::new();
        if let Some(entity_id) = params.entity_id {
            sql.push_str(" AND entity_id = ?");
            bind.push(SqlValue::Uuid(entity_id));
        }
        if let Some(room_id) = params.room_id {
            sql.push_str(" AND room_id = ?");
            bind.push(SqlValue::Uuid(room_id));
        }
        if let Some(log_type) = &params.log_type {
            sql.push_str(" AND type = ?");
            bind.push(SqlValue::Text(log_type.clone()));
        }
        sql.push_str(" ORDER BY created_at DESC");
        push_limit_offset(&mut sql, &mut bind, params.count, params.offset);
        let rows = self.fetch_all(&sql, bind).await?;
        rows.iter().map(schema::log::log_from_row).collect()
    }

    async fn delete_log(&self, log_id: Uuid) -> Result<bool> {
        let affected = self
            .execute("DELETE FROM logs WHERE id = ?", vec![SqlValue::Uuid(log_id)])
            .await?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_lists() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
        assert_eq!(placeholders(0), "");
    }

    #[test]
    fn string_arrays_encode_as_json() {
        let tags = vec!["a".to_string(), "b".to_string()];
        assert_eq!(json_array(&tags), serde_json::json!(["a", "b"]));
    }
}
