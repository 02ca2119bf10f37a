//! Resumable position of a random source reader.

use checkpoint::Checkpoint;
use serde::{Deserialize, Serialize};

/// Row cursor of a random source reader.
///
/// `next_row` is the zero-based cursor of the next row to produce; every row
/// before it has already been returned by `read_batch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomSourceCheckpoint {
    pub next_row: u64,
}

impl Checkpoint for RandomSourceCheckpoint {
    const CONNECTOR_TYPE: &'static str = "random";
}
