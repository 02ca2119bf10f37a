//! The persisted checkpoint pair of one shard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sync_core::ShardRange;

use crate::{CheckpointEnvelope, CheckpointID};

/// Source and sink positions of one shard at a quiescent point.
///
/// Written by the orchestrator after every checkpoint interval and once more
/// when the shard completes. On resume, the reader is reopened with `source`
/// and the writer with `sink`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardCheckpoint {
    /// Job the shard belongs to
    pub job: String,
    /// Table being transferred
    pub table: String,
    /// Position of the shard within the table's shard plan
    pub shard_index: usize,
    /// Row range assigned to the shard
    pub range: ShardRange,
    /// Reader position, absent when the reader had nothing to save
    pub source: Option<CheckpointEnvelope>,
    /// Writer position, absent when the writer had nothing to save
    pub sink: Option<CheckpointEnvelope>,
    /// Rows durably written so far, across resumes
    pub rows_transferred: u64,
    /// Whether the shard ran to exhaustion
    pub completed: bool,
    /// When this checkpoint was taken
    pub created_at: DateTime<Utc>,
}

impl ShardCheckpoint {
    /// Storage key of this checkpoint.
    pub fn id(&self) -> CheckpointID {
        CheckpointID::new(&self.job, &self.table, self.shard_index)
    }
}
