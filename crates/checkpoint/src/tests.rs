//! Unit tests for the checkpoint crate.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sync_core::ShardRange;
use tempfile::TempDir;

use crate::{
    Checkpoint, CheckpointEnvelope, CheckpointID, CheckpointStorage, CheckpointStore,
    FilesystemStore, NullStore, ShardCheckpoint,
};

/// Test checkpoint type for unit tests.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
struct TestCheckpoint {
    next_row: u64,
}

impl Checkpoint for TestCheckpoint {
    const CONNECTOR_TYPE: &'static str = "test";
}

/// A second checkpoint type, used to exercise type mismatches.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
struct OtherCheckpoint {
    offset: u64,
}

impl Checkpoint for OtherCheckpoint {
    const CONNECTOR_TYPE: &'static str = "other";
}

fn shard_checkpoint(table: &str, shard_index: usize, next_row: u64) -> ShardCheckpoint {
    ShardCheckpoint {
        job: "job-1".to_string(),
        table: table.to_string(),
        shard_index,
        range: ShardRange::new(0, 100),
        source: Some(CheckpointEnvelope::new(&TestCheckpoint { next_row }).unwrap()),
        sink: None,
        rows_transferred: next_row,
        completed: false,
        created_at: Utc::now(),
    }
}

// ============================================================================
// CheckpointEnvelope Tests
// ============================================================================

#[test]
fn test_envelope_records_connector_type() {
    let envelope = CheckpointEnvelope::new(&TestCheckpoint { next_row: 42 }).unwrap();

    assert_eq!(envelope.connector_type(), "test");
    assert_eq!(envelope.state["next_row"], 42);

    let parsed: TestCheckpoint = envelope.parse().unwrap();
    assert_eq!(parsed.next_row, 42);
}

#[test]
fn test_envelope_survives_json() {
    let envelope = CheckpointEnvelope::new(&TestCheckpoint { next_row: 12345 }).unwrap();
    let json = serde_json::to_string_pretty(&envelope).unwrap();
    let loaded: CheckpointEnvelope = serde_json::from_str(&json).unwrap();

    assert_eq!(loaded, envelope);
    let parsed: TestCheckpoint = loaded.parse().unwrap();
    assert_eq!(parsed.next_row, 12345);
}

#[test]
fn test_envelope_type_mismatch() {
    let envelope = CheckpointEnvelope::new(&TestCheckpoint { next_row: 1 }).unwrap();

    let result: anyhow::Result<OtherCheckpoint> = envelope.parse();
    let err = result.unwrap_err().to_string();
    assert!(err.contains("Checkpoint type mismatch"), "got: {err}");
    assert!(err.contains("expected 'other'"), "got: {err}");
    assert!(err.contains("found 'test'"), "got: {err}");
}

#[test]
fn test_envelope_malformed_state() {
    let envelope = CheckpointEnvelope {
        connector_type: "test".to_string(),
        state: serde_json::json!({ "unexpected": true }),
    };
    let result: anyhow::Result<TestCheckpoint> = envelope.parse();
    assert!(result.is_err());
}

// ============================================================================
// FilesystemStore Tests
// ============================================================================

#[tokio::test]
async fn test_filesystem_store_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let store = FilesystemStore::new(tmp.path());

    let cp = shard_checkpoint("orders", 3, 50);
    store.store_checkpoint(&cp).await.unwrap();

    let loaded = store.read_checkpoint(&cp.id()).await.unwrap().unwrap();
    assert_eq!(loaded, cp);

    let expected = tmp
        .path()
        .join("job-1")
        .join("orders")
        .join("shard-00003.json");
    assert!(expected.exists());
}

#[tokio::test]
async fn test_filesystem_store_replaces_previous() {
    let tmp = TempDir::new().unwrap();
    let store = FilesystemStore::new(tmp.path());

    store
        .store_checkpoint(&shard_checkpoint("orders", 0, 10))
        .await
        .unwrap();
    let mut later = shard_checkpoint("orders", 0, 20);
    later.completed = true;
    store.store_checkpoint(&later).await.unwrap();

    let loaded = store
        .read_checkpoint(&CheckpointID::new("job-1", "orders", 0))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.rows_transferred, 20);
    assert!(loaded.completed);

    // No temporary files left behind
    let files: Vec<_> = std::fs::read_dir(tmp.path().join("job-1").join("orders"))
        .unwrap()
        .collect();
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn test_filesystem_store_missing() {
    let tmp = TempDir::new().unwrap();
    let store = FilesystemStore::new(tmp.path().join("does-not-exist"));

    let loaded = store
        .read_checkpoint(&CheckpointID::new("job-1", "orders", 0))
        .await
        .unwrap();
    assert!(loaded.is_none());
    assert!(store.list_checkpoints("job-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_filesystem_store_list_is_ordered() {
    let tmp = TempDir::new().unwrap();
    let store = FilesystemStore::new(tmp.path());

    for (table, shard) in [("users", 1), ("orders", 1), ("users", 0), ("orders", 0)] {
        store
            .store_checkpoint(&shard_checkpoint(table, shard, 1))
            .await
            .unwrap();
    }

    let listed: Vec<(String, usize)> = store
        .list_checkpoints("job-1")
        .await
        .unwrap()
        .into_iter()
        .map(|cp| (cp.table, cp.shard_index))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("orders".to_string(), 0),
            ("orders".to_string(), 1),
            ("users".to_string(), 0),
            ("users".to_string(), 1),
        ]
    );

    assert!(store.list_checkpoints("other-job").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_filesystem_store_sanitizes_names() {
    let tmp = TempDir::new().unwrap();
    let store = FilesystemStore::new(tmp.path());

    let mut cp = shard_checkpoint("../escape", 0, 1);
    cp.job = "a/b".to_string();
    store.store_checkpoint(&cp).await.unwrap();

    assert!(tmp.path().join("a_2Fb").join(".._2Fescape").is_dir());
    let loaded = store.read_checkpoint(&cp.id()).await.unwrap().unwrap();
    assert_eq!(loaded.table, "../escape");
}

#[tokio::test]
async fn test_filesystem_store_keeps_similar_names_apart() {
    let tmp = TempDir::new().unwrap();
    let store = FilesystemStore::new(tmp.path());

    for (table, rows) in [("a/b", 1), ("a_b", 2), ("..", 3), ("", 4)] {
        store
            .store_checkpoint(&shard_checkpoint(table, 0, rows))
            .await
            .unwrap();
    }

    let listed = store.list_checkpoints("job-1").await.unwrap();
    assert_eq!(listed.len(), 4);
    for (table, rows) in [("a/b", 1), ("a_b", 2), ("..", 3), ("", 4)] {
        let loaded = store
            .read_checkpoint(&shard_checkpoint(table, 0, rows).id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.table, table);
        assert_eq!(loaded.rows_transferred, rows);
    }
}

// ============================================================================
// NullStore / CheckpointStorage Tests
// ============================================================================

#[tokio::test]
async fn test_null_store_forgets() {
    let store = NullStore;
    let cp = shard_checkpoint("orders", 0, 5);
    store.store_checkpoint(&cp).await.unwrap();
    assert!(store.read_checkpoint(&cp.id()).await.unwrap().is_none());
}

#[test]
fn test_storage_config_from_json() {
    let storage: CheckpointStorage =
        serde_json::from_str(r#"{"storage": "filesystem", "dir": "/tmp/cp"}"#).unwrap();
    assert_eq!(
        storage,
        CheckpointStorage::Filesystem {
            dir: "/tmp/cp".into()
        }
    );
    assert!(storage.is_enabled());

    let disabled: CheckpointStorage = serde_json::from_str(r#"{"storage": "disabled"}"#).unwrap();
    assert!(!disabled.is_enabled());
}

#[test]
fn test_storage_config_default_dir() {
    let storage: CheckpointStorage = serde_json::from_str(r#"{"storage": "filesystem"}"#).unwrap();
    assert_eq!(storage, CheckpointStorage::default());
}
