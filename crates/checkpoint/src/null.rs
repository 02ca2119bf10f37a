//! Checkpoint store used when checkpointing is disabled.

use anyhow::Result;
use async_trait::async_trait;

use crate::store::{CheckpointID, CheckpointStore};
use crate::ShardCheckpoint;

/// A store that accepts every checkpoint and remembers none of them.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

#[async_trait]
impl CheckpointStore for NullStore {
    async fn store_checkpoint(&self, _checkpoint: &ShardCheckpoint) -> Result<()> {
        Ok(())
    }

    async fn read_checkpoint(&self, _id: &CheckpointID) -> Result<Option<ShardCheckpoint>> {
        Ok(None)
    }

    async fn list_checkpoints(&self, _job: &str) -> Result<Vec<ShardCheckpoint>> {
        Ok(Vec::new())
    }
}
