//! End-to-end adapter tests against in-memory SQLite.

use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use elizaos_adapters::{
    AdapterError, CreateRelationshipParams, DatabaseAdapter, Entity, GetLogsParams,
    GetMemoriesParams, GetTasksParams, LogParams, Memory, Room, SearchMemoriesParams,
    SqliteAdapter, Task, World,
};
use elizaos_adapters::types::{Agent, ChannelType};

struct Fixture {
    adapter: SqliteAdapter,
    agent_id: Uuid,
    entity_id: Uuid,
    world_id: Uuid,
    room_id: Uuid,
}

fn test_agent(agent_id: Uuid) -> Agent {
    Agent {
        id: agent_id,
        name: "test-agent".to_string(),
        settings: json!({ "model": "local" }),
        enabled: true,
        created_at: None,
        updated_at: None,
    }
}

fn test_room(room_id: Uuid, agent_id: Uuid, world_id: Option<Uuid>) -> Room {
    Room {
        id: room_id,
        agent_id,
        name: Some("general".to_string()),
        source: "test".to_string(),
        room_type: ChannelType::Group,
        channel_id: None,
        world_id,
        metadata: json!({}),
        created_at: None,
    }
}

async fn fixture() -> Fixture {
    let agent_id = Uuid::new_v4();
    let adapter = SqliteAdapter::open_in_memory(agent_id).await.unwrap();
    adapter.init().await.unwrap();
    adapter.run_migrations().await.unwrap();

    adapter.create_agent(&test_agent(agent_id)).await.unwrap();

    let world_id = Uuid::new_v4();
    adapter
        .create_world(&World {
            id: world_id,
            agent_id,
            name: "test-world".to_string(),
            server_id: Some("srv-1".to_string()),
            metadata: json!({}),
            created_at: None,
        })
        .await
        .unwrap();

    let entity_id = Uuid::new_v4();
    adapter
        .create_entities(&[Entity {
            id: entity_id,
            agent_id,
            names: vec!["Alice".to_string()],
            metadata: json!({}),
            created_at: None,
        }])
        .await
        .unwrap();

    let room_id = Uuid::new_v4();
    adapter
        .create_rooms(&[test_room(room_id, agent_id, Some(world_id))])
        .await
        .unwrap();
    adapter.add_participants_room(&[entity_id], room_id).await.unwrap();

    Fixture {
        adapter,
        agent_id,
        entity_id,
        world_id,
        room_id,
    }
}

fn message(f: &Fixture, text: &str, embedding: Option<Vec<f32>>) -> Memory {
    Memory {
        id: None,
        entity_id: f.entity_id,
        agent_id: f.agent_id,
        room_id: f.room_id,
        world_id: Some(f.world_id),
        content: json!({ "text": text }),
        embedding,
        unique: false,
        metadata: json!({}),
        created_at: None,
        similarity: None,
    }
}

/// 384-component vector with the first two components set.
fn vec384(x: f32, y: f32) -> Vec<f32> {
    let mut v = vec![0.0_f32; 384];
    v[0] = x;
    v[1] = y;
    v
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let f = fixture().await;
    // A second (and third) run is a no-op; existing data survives.
    f.adapter.run_migrations().await.unwrap();
    f.adapter.run_migrations().await.unwrap();
    assert!(f.adapter.get_agent(f.agent_id).await.unwrap().is_some());
}

#[tokio::test]
async fn schema_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agent.db");
    let path = path.to_str().unwrap();
    let agent_id = Uuid::new_v4();

    {
        let adapter = SqliteAdapter::open(path, agent_id).await.unwrap();
        adapter.init().await.unwrap();
        adapter.run_migrations().await.unwrap();
        adapter.create_agent(&test_agent(agent_id)).await.unwrap();
        adapter.close().await.unwrap();
    }

    let adapter = SqliteAdapter::open(path, agent_id).await.unwrap();
    adapter.init().await.unwrap();
    adapter.run_migrations().await.unwrap();
    let agent = adapter.get_agent(agent_id).await.unwrap().unwrap();
    assert_eq!(agent.name, "test-agent");
}

#[tokio::test]
async fn agent_round_trip() {
    let f = fixture().await;

    let mut agent = f.adapter.get_agent(f.agent_id).await.unwrap().unwrap();
    assert_eq!(agent.name, "test-agent");
    assert!(agent.enabled);

    agent.name = "renamed".to_string();
    agent.enabled = false;
    assert!(f.adapter.update_agent(&agent).await.unwrap());

    let agent = f.adapter.get_agent(f.agent_id).await.unwrap().unwrap();
    assert_eq!(agent.name, "renamed");
    assert!(!agent.enabled);

    assert_eq!(f.adapter.get_agents().await.unwrap().len(), 1);
    assert!(f.adapter.delete_agent(f.agent_id).await.unwrap());
    assert!(f.adapter.get_agent(f.agent_id).await.unwrap().is_none());
}

#[tokio::test]
async fn entities_and_participants() {
    let f = fixture().await;

    let entities = f.adapter.get_entities_for_room(f.room_id).await.unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].names, vec!["Alice".to_string()]);

    let mut entity = entities.into_iter().next().unwrap();
    entity.names.push("Al".to_string());
    assert!(f.adapter.update_entity(&entity).await.unwrap());
    let entities = f.adapter.get_entities_by_ids(&[f.entity_id]).await.unwrap();
    assert_eq!(entities[0].names.len(), 2);

    assert_eq!(
        f.adapter.get_participants_for_room(f.room_id).await.unwrap(),
        vec![f.entity_id]
    );
    assert_eq!(
        f.adapter.get_rooms_for_participant(f.entity_id).await.unwrap(),
        vec![f.room_id]
    );

    // Re-adding is a no-op, not an error.
    f.adapter
        .add_participants_room(&[f.entity_id], f.room_id)
        .await
        .unwrap();
    assert_eq!(
        f.adapter.get_participants_for_room(f.room_id).await.unwrap().len(),
        1
    );

    assert!(f
        .adapter
        .get_participant_user_state(f.room_id, f.entity_id)
        .await
        .unwrap()
        .is_none());
    f.adapter
        .set_participant_user_state(f.room_id, f.entity_id, Some("FOLLOWED".to_string()))
        .await
        .unwrap();
    assert_eq!(
        f.adapter
            .get_participant_user_state(f.room_id, f.entity_id)
            .await
            .unwrap()
            .as_deref(),
        Some("FOLLOWED")
    );

    assert!(f.adapter.remove_participant(f.entity_id, f.room_id).await.unwrap());
    assert!(f.adapter.get_participants_for_room(f.room_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn memory_round_trip_with_embedding() {
    let f = fixture().await;

    let memory_id = f
        .adapter
        .create_memory(&message(&f, "hello there", Some(vec384(1.0, 0.0))), "messages")
        .await
        .unwrap();

    let stored = f.adapter.get_memory_by_id(memory_id).await.unwrap().unwrap();
    assert_eq!(stored.content["text"], "hello there");
    assert_eq!(stored.embedding.as_ref().map(Vec::len), Some(384));

    // Re-creating with the same id leaves the original untouched.
    let mut dup = message(&f, "other text", None);
    dup.id = Some(memory_id);
    assert_eq!(
        f.adapter.create_memory(&dup, "messages").await.unwrap(),
        memory_id
    );
    let stored = f.adapter.get_memory_by_id(memory_id).await.unwrap().unwrap();
    assert_eq!(stored.content["text"], "hello there");

    assert!(f.adapter.delete_memory(memory_id).await.unwrap());
    assert!(f.adapter.get_memory_by_id(memory_id).await.unwrap().is_none());
}

#[tokio::test]
async fn get_memories_filters_and_orders() {
    let f = fixture().await;

    let base = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
    for i in 0..5 {
        let mut memory = message(&f, &format!("m{i}"), None);
        memory.created_at = Some(base + Duration::seconds(i));
        memory.unique = i % 2 == 0;
        f.adapter.create_memory(&memory, "messages").await.unwrap();
    }

    let all = f
        .adapter
        .get_memories(&GetMemoriesParams {
            table_name: "messages".to_string(),
            room_id: Some(f.room_id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 5);
    // Newest first.
    assert_eq!(all[0].content["text"], "m4");
    assert_eq!(all[4].content["text"], "m0");

    let unique_only = f
        .adapter
        .get_memories(&GetMemoriesParams {
            table_name: "messages".to_string(),
            unique: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(unique_only.len(), 3);

    let paged = f
        .adapter
        .get_memories(&GetMemoriesParams {
            table_name: "messages".to_string(),
            count: Some(2),
            offset: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(paged.len(), 2);
    assert_eq!(paged[0].content["text"], "m3");

    let ranged = f
        .adapter
        .get_memories(&GetMemoriesParams {
            table_name: "messages".to_string(),
            start: Some(base + Duration::seconds(1)),
            end: Some(base + Duration::seconds(3)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(ranged.len(), 3);

    assert_eq!(
        f.adapter.count_memories(f.room_id, false, "messages").await.unwrap(),
        5
    );
    assert_eq!(
        f.adapter.count_memories(f.room_id, true, "messages").await.unwrap(),
        3
    );

    let by_world = f
        .adapter
        .get_memories_by_world_id("messages", f.world_id, Some(2))
        .await
        .unwrap();
    assert_eq!(by_world.len(), 2);

    let by_rooms = f
        .adapter
        .get_memories_by_room_ids("messages", &[f.room_id], None)
        .await
        .unwrap();
    assert_eq!(by_rooms.len(), 5);

    assert_eq!(
        f.adapter.delete_all_memories(f.room_id, "messages").await.unwrap(),
        5
    );
}

#[tokio::test]
async fn document_metadata_is_validated_before_write() {
    let f = fixture().await;

    let mut doc = message(&f, "a document", None);
    doc.metadata = json!({ "type": "document" });
    let err = f.adapter.create_memory(&doc, "documents").await.unwrap_err();
    assert!(matches!(err, AdapterError::Validation(_)));

    // Nothing was persisted.
    let stored = f
        .adapter
        .get_memories(&GetMemoriesParams {
            table_name: "documents".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(stored.is_empty());

    doc.metadata = json!({ "type": "document", "timestamp": 1_767_268_800_000_i64 });
    f.adapter.create_memory(&doc, "documents").await.unwrap();
}

#[tokio::test]
async fn fragment_metadata_requires_parent_and_position() {
    let f = fixture().await;

    let mut fragment = message(&f, "chunk", None);
    fragment.metadata = json!({ "type": "fragment", "position": 0 });
    let err = f.adapter.create_memory(&fragment, "fragments").await.unwrap_err();
    assert!(matches!(err, AdapterError::Validation(_)));

    fragment.metadata = json!({
        "type": "fragment",
        "documentId": Uuid::new_v4().to_string(),
        "position": 0,
    });
    f.adapter.create_memory(&fragment, "fragments").await.unwrap();
}

#[tokio::test]
async fn search_returns_nearest_within_threshold() {
    let f = fixture().await;

    let exact = f
        .adapter
        .create_memory(&message(&f, "exact", Some(vec384(1.0, 0.0))), "messages")
        .await
        .unwrap();
    let close = f
        .adapter
        .create_memory(&message(&f, "close", Some(vec384(1.0, 1.0))), "messages")
        .await
        .unwrap();
    // Orthogonal: distance 1.0, outside any sane threshold.
    f.adapter
        .create_memory(&message(&f, "far", Some(vec384(0.0, 1.0))), "messages")
        .await
        .unwrap();

    let results = f
        .adapter
        .search_memories(&SearchMemoriesParams {
            table_name: "messages".to_string(),
            embedding: vec384(1.0, 0.0),
            room_id: Some(f.room_id),
            world_id: None,
            entity_id: None,
            match_threshold: None,
            count: None,
            unique: false,
        })
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, Some(exact));
    assert_eq!(results[1].id, Some(close));
    assert!((results[0].similarity.unwrap() - 1.0).abs() < 1e-6);
    assert!(results[1].similarity.unwrap() < results[0].similarity.unwrap());

    // A tighter threshold drops the 45-degree neighbor too.
    let results = f
        .adapter
        .search_memories(&SearchMemoriesParams {
            table_name: "messages".to_string(),
            embedding: vec384(1.0, 0.0),
            room_id: Some(f.room_id),
            world_id: None,
            entity_id: None,
            match_threshold: Some(0.1),
            count: None,
            unique: false,
        })
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, Some(exact));
}

#[tokio::test]
async fn embedding_dimension_is_enforced() {
    let f = fixture().await;
    assert_eq!(f.adapter.embedding_dimension(), 384);

    let err = f
        .adapter
        .create_memory(&message(&f, "short", Some(vec![1.0; 512])), "messages")
        .await
        .unwrap_err();
    assert!(matches!(err, AdapterError::Validation(_)));

    f.adapter.ensure_embedding_dimension(512).unwrap();
    assert_eq!(f.adapter.embedding_dimension(), 512);
    f.adapter
        .create_memory(&message(&f, "now fits", Some(vec![1.0; 512])), "messages")
        .await
        .unwrap();

    let err = f.adapter.ensure_embedding_dimension(999).unwrap_err();
    assert!(matches!(err, AdapterError::Validation(_)));

    let err = f
        .adapter
        .search_memories(&SearchMemoriesParams {
            table_name: "messages".to_string(),
            embedding: vec384(1.0, 0.0),
            room_id: None,
            world_id: None,
            entity_id: None,
            match_threshold: None,
            count: None,
            unique: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AdapterError::Validation(_)));
}

#[tokio::test]
async fn duplicate_relationship_is_a_constraint_violation() {
    let f = fixture().await;

    let other = Uuid::new_v4();
    f.adapter
        .create_entities(&[Entity {
            id: other,
            agent_id: f.agent_id,
            names: vec!["Bob".to_string()],
            metadata: json!({}),
            created_at: None,
        }])
        .await
        .unwrap();

    let params = CreateRelationshipParams {
        source_entity_id: f.entity_id,
        target_entity_id: other,
        tags: vec!["friend".to_string()],
        metadata: json!({}),
    };
    let relationship = f.adapter.create_relationship(&params).await.unwrap();

    let err = f.adapter.create_relationship(&params).await.unwrap_err();
    assert!(matches!(err, AdapterError::Constraint(_)));

    let fetched = f
        .adapter
        .get_relationship(f.entity_id, other)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.id, relationship.id);
    assert_eq!(fetched.tags, vec!["friend".to_string()]);

    let tagged = f
        .adapter
        .get_relationships(f.entity_id, Some(&["friend".to_string()]))
        .await
        .unwrap();
    assert_eq!(tagged.len(), 1);
    let none = f
        .adapter
        .get_relationships(f.entity_id, Some(&["enemy".to_string()]))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn room_delete_cascades() {
    let f = fixture().await;

    let memory_id = f
        .adapter
        .create_memory(&message(&f, "doomed", Some(vec384(1.0, 0.0))), "messages")
        .await
        .unwrap();

    assert!(f.adapter.delete_room(f.room_id).await.unwrap());

    assert!(f.adapter.get_memory_by_id(memory_id).await.unwrap().is_none());
    assert!(f.adapter.get_participants_for_room(f.room_id).await.unwrap().is_empty());
    // The entity itself survives.
    assert_eq!(f.adapter.get_entities_by_ids(&[f.entity_id]).await.unwrap().len(), 1);
}

#[tokio::test]
async fn world_delete_cascades_to_rooms() {
    let f = fixture().await;

    assert!(f.adapter.remove_world(f.world_id).await.unwrap());
    assert!(f.adapter.get_rooms_by_ids(&[f.room_id]).await.unwrap().is_empty());
}

#[tokio::test]
async fn tasks_round_trip() {
    let f = fixture().await;

    let task_id = f
        .adapter
        .create_task(&Task {
            id: None,
            agent_id: f.agent_id,
            name: "sweep".to_string(),
            description: Some("periodic cleanup".to_string()),
            room_id: Some(f.room_id),
            world_id: None,
            entity_id: None,
            tags: vec!["queue".to_string(), "repeat".to_string()],
            metadata: json!({ "updateInterval": 600 }),
            created_at: None,
            updated_at: None,
        })
        .await
        .unwrap();

    let mut task = f.adapter.get_task(task_id).await.unwrap().unwrap();
    assert_eq!(task.name, "sweep");

    let by_name = f.adapter.get_tasks_by_name("sweep").await.unwrap();
    assert_eq!(by_name.len(), 1);

    let tagged = f
        .adapter
        .get_tasks(&GetTasksParams {
            room_id: Some(f.room_id),
            entity_id: None,
            tags: Some(vec!["queue".to_string()]),
        })
        .await
        .unwrap();
    assert_eq!(tagged.len(), 1);

    let missing_tag = f
        .adapter
        .get_tasks(&GetTasksParams {
            room_id: None,
            entity_id: None,
            tags: Some(vec!["queue".to_string(), "oneshot".to_string()]),
        })
        .await
        .unwrap();
    assert!(missing_tag.is_empty());

    task.name = "sweep-v2".to_string();
    assert!(f.adapter.update_task(&task).await.unwrap());
    assert!(f.adapter.get_tasks_by_name("sweep").await.unwrap().is_empty());

    assert!(f.adapter.delete_task(task_id).await.unwrap());
    assert!(f.adapter.get_task(task_id).await.unwrap().is_none());
}

#[tokio::test]
async fn cache_round_trip_and_expiry() {
    let f = fixture().await;

    f.adapter
        .set_cache("greeting", json!({ "text": "hi" }), None)
        .await
        .unwrap();
    assert_eq!(
        f.adapter.get_cache("greeting").await.unwrap(),
        Some(json!({ "text": "hi" }))
    );

    // Upsert replaces.
    f.adapter
        .set_cache("greeting", json!({ "text": "hello" }), None)
        .await
        .unwrap();
    assert_eq!(
        f.adapter.get_cache("greeting").await.unwrap(),
        Some(json!({ "text": "hello" }))
    );

    // Already-expired entries read as absent and are removed.
    f.adapter
        .set_cache("stale", json!(1), Some(Utc::now() - Duration::seconds(5)))
        .await
        .unwrap();
    assert_eq!(f.adapter.get_cache("stale").await.unwrap(), None);
    assert_eq!(f.adapter.get_cache("stale").await.unwrap(), None);

    assert!(f.adapter.delete_cache("greeting").await.unwrap());
    assert_eq!(f.adapter.get_cache("greeting").await.unwrap(), None);
}

#[tokio::test]
async fn logs_round_trip() {
    let f = fixture().await;

    f.adapter
        .log(&LogParams {
            entity_id: f.entity_id,
            room_id: Some(f.room_id),
            log_type: "action".to_string(),
            body: json!({ "name": "REPLY" }),
        })
        .await
        .unwrap();
    f.adapter
        .log(&LogParams {
            entity_id: f.entity_id,
            room_id: None,
            log_type: "evaluator".to_string(),
            body: json!({ "name": "goal" }),
        })
        .await
        .unwrap();

    let all = f.adapter.get_logs(&GetLogsParams::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    let actions = f
        .adapter
        .get_logs(&GetLogsParams {
            log_type: Some("action".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].body["name"], "REPLY");

    assert!(f.adapter.delete_log(actions[0].id).await.unwrap());
    assert_eq!(f.adapter.get_logs(&GetLogsParams::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn close_is_idempotent_and_blocks_new_work() {
    let f = fixture().await;

    assert!(f.adapter.is_ready().await.unwrap());
    f.adapter.close().await.unwrap();
    f.adapter.close().await.unwrap();

    assert!(f.adapter.get_connection().is_err());
    let err = f.adapter.get_agent(f.agent_id).await.unwrap_err();
    assert!(matches!(err, AdapterError::ShuttingDown));
    assert!(!f.adapter.is_ready().await.unwrap());
}

#[tokio::test]
async fn update_memory_replaces_content_and_embedding() {
    let f = fixture().await;

    let memory_id = f
        .adapter
        .create_memory(&message(&f, "v1", Some(vec384(1.0, 0.0))), "messages")
        .await
        .unwrap();

    let mut memory = f.adapter.get_memory_by_id(memory_id).await.unwrap().unwrap();
    memory.content = json!({ "text": "v2" });
    memory.embedding = Some(vec384(0.0, 1.0));
    assert!(f.adapter.update_memory(&memory).await.unwrap());

    let stored = f.adapter.get_memory_by_id(memory_id).await.unwrap().unwrap();
    assert_eq!(stored.content["text"], "v2");
    let embedding = stored.embedding.clone().unwrap();
    assert_eq!(embedding[0], 0.0);
    assert_eq!(embedding[1], 1.0);

    // Metadata-only update, embedding untouched.
    let mut memory = stored;
    memory.embedding = None;
    memory.metadata = json!({ "edited": true });
    assert!(f.adapter.update_memory(&memory).await.unwrap());
    let stored = f.adapter.get_memory_by_id(memory_id).await.unwrap().unwrap();
    assert_eq!(stored.metadata["edited"], true);
    assert!(stored.embedding.is_some());
}

#[tokio::test]
async fn recreating_an_existing_id_keeps_the_stored_embedding() {
    let f = fixture().await;

    let memory_id = f
        .adapter
        .create_memory(&message(&f, "original", Some(vec384(1.0, 0.0))), "messages")
        .await
        .unwrap();

    let mut dup = message(&f, "impostor", Some(vec384(0.0, 1.0)));
    dup.id = Some(memory_id);
    assert_eq!(
        f.adapter.create_memory(&dup, "messages").await.unwrap(),
        memory_id
    );

    let stored = f.adapter.get_memory_by_id(memory_id).await.unwrap().unwrap();
    assert_eq!(stored.content["text"], "original");
    let embedding = stored.embedding.unwrap();
    assert_eq!(embedding[0], 1.0);
    assert_eq!(embedding[1], 0.0);
}

#[tokio::test]
async fn update_rejects_metadata_that_breaks_its_table_shape() {
    let f = fixture().await;

    let document_id = Uuid::new_v4().to_string();
    let mut fragment = message(&f, "chunk", None);
    fragment.metadata = json!({
        "type": "fragment",
        "documentId": document_id.clone(),
        "position": 0,
    });
    let memory_id = f.adapter.create_memory(&fragment, "fragments").await.unwrap();

    let mut stored = f.adapter.get_memory_by_id(memory_id).await.unwrap().unwrap();
    stored.metadata = json!({ "type": "fragment" });
    let err = f.adapter.update_memory(&stored).await.unwrap_err();
    assert!(matches!(err, AdapterError::Validation(_)));

    let kept = f.adapter.get_memory_by_id(memory_id).await.unwrap().unwrap();
    assert_eq!(kept.metadata["documentId"], document_id);
    assert_eq!(kept.metadata["position"], 0);

    // Updating a memory that no longer exists is a no-op, not an error.
    let mut gone = kept;
    gone.id = Some(Uuid::new_v4());
    gone.metadata = json!({});
    assert!(!f.adapter.update_memory(&gone).await.unwrap());
}

#[tokio::test]
async fn rooms_and_worlds_update() {
    let f = fixture().await;

    let mut room = f
        .adapter
        .get_rooms_by_ids(&[f.room_id])
        .await
        .unwrap()
        .into_iter()
        .next()
        .unwrap();
    room.name = Some("renamed".to_string());
    assert!(f.adapter.update_room(&room).await.unwrap());
    let room = f
        .adapter
        .get_rooms_by_ids(&[f.room_id])
        .await
        .unwrap()
        .into_iter()
        .next()
        .unwrap();
    assert_eq!(room.name.as_deref(), Some("renamed"));

    let mut world = f.adapter.get_world(f.world_id).await.unwrap().unwrap();
    world.name = "renamed-world".to_string();
    assert!(f.adapter.update_world(&world).await.unwrap());
    assert_eq!(
        f.adapter.get_all_worlds().await.unwrap()[0].name,
        "renamed-world"
    );

    assert_eq!(f.adapter.get_rooms_by_world(f.world_id).await.unwrap().len(), 1);
    assert_eq!(f.adapter.delete_rooms_by_world_id(f.world_id).await.unwrap(), 1);
    assert!(f.adapter.get_rooms_by_world(f.world_id).await.unwrap().is_empty());
    // The world itself remains.
    assert!(f.adapter.get_world(f.world_id).await.unwrap().is_some());
}

#[tokio::test]
async fn delete_many_memories_removes_only_listed_ids() {
    let f = fixture().await;

    let a = f.adapter.create_memory(&message(&f, "a", None), "messages").await.unwrap();
    let b = f.adapter.create_memory(&message(&f, "b", None), "messages").await.unwrap();
    let keep = f.adapter.create_memory(&message(&f, "keep", None), "messages").await.unwrap();

    assert_eq!(f.adapter.delete_many_memories(&[a, b]).await.unwrap(), 2);
    assert!(f.adapter.get_memory_by_id(a).await.unwrap().is_none());
    assert!(f.adapter.get_memory_by_id(keep).await.unwrap().is_some());
    assert_eq!(
        f.adapter
            .get_memories_by_ids(&[a, b, keep], "messages")
            .await
            .unwrap()
            .len(),
        1
    );
}
