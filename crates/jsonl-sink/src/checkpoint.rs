//! Resumable position of a JSONL writer.

use checkpoint::Checkpoint;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File and byte offset after the last fully written batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonlSinkCheckpoint {
    /// File the writer appends to
    pub path: PathBuf,
    /// Length of the durable prefix of the file
    pub offset: u64,
    /// Records in the durable prefix
    pub rows: u64,
}

impl Checkpoint for JsonlSinkCheckpoint {
    const CONNECTOR_TYPE: &'static str = "jsonl";
}
