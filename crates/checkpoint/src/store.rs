//! Checkpoint storage trait and identifiers
//!
//! This module defines the CheckpointStore trait for backend-agnostic
//! shard checkpoint storage operations.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ShardCheckpoint;

/// Checkpoint identifier for storage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckpointID {
    /// Job name
    pub job: String,
    /// Table name
    pub table: String,
    /// Shard position within the table's shard plan
    pub shard_index: usize,
}

impl CheckpointID {
    pub fn new(job: impl Into<String>, table: impl Into<String>, shard_index: usize) -> Self {
        Self {
            job: job.into(),
            table: table.into(),
            shard_index,
        }
    }
}

impl fmt::Display for CheckpointID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.job, self.table, self.shard_index)
    }
}

/// Trait for checkpoint storage operations.
///
/// This trait abstracts the storage backend, allowing the orchestrator to
/// work with:
/// - Filesystem storage (`FilesystemStore`)
/// - No storage at all (`NullStore`)
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Store a shard checkpoint, replacing any previous one for the same shard.
    async fn store_checkpoint(&self, checkpoint: &ShardCheckpoint) -> Result<()>;

    /// Read the latest checkpoint of a shard.
    ///
    /// Returns None if the checkpoint doesn't exist.
    async fn read_checkpoint(&self, id: &CheckpointID) -> Result<Option<ShardCheckpoint>>;

    /// List every stored checkpoint of a job, ordered by table then shard.
    async fn list_checkpoints(&self, job: &str) -> Result<Vec<ShardCheckpoint>>;
}
