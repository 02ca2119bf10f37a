//! Checkpoint management for shardsync
//!
//! Provides connector-agnostic checkpoint handling with support for
//! connector-specific checkpoint types.
//!
//! # Architecture
//!
//! - The `Checkpoint` trait is implemented by each connector's own checkpoint type
//! - `CheckpointEnvelope` wraps a connector checkpoint as an opaque, self-describing
//!   JSON payload that readers and writers hand back and forth with the orchestrator
//! - `ShardCheckpoint` is the persisted pair of source and sink envelopes for one shard
//! - `CheckpointStore` abstracts where shard checkpoints live
//!
//! ## Storage Backends
//!
//! - `FilesystemStore` - Stores one JSON file per shard
//! - `NullStore` - Discards everything (checkpointing disabled)

mod config;
mod envelope;
mod filesystem;
mod null;
mod shard;
pub mod store;

#[cfg(test)]
mod tests;

pub use config::CheckpointStorage;
pub use envelope::CheckpointEnvelope;
pub use filesystem::FilesystemStore;
pub use null::NullStore;
pub use shard::ShardCheckpoint;
pub use store::{CheckpointID, CheckpointStore};

/// Trait that connector-specific checkpoints must implement.
///
/// # Example
///
/// ```rust
/// use checkpoint::{Checkpoint, CheckpointEnvelope};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct CursorCheckpoint {
///     pub next_row: u64,
/// }
///
/// impl Checkpoint for CursorCheckpoint {
///     const CONNECTOR_TYPE: &'static str = "cursor";
/// }
///
/// let envelope = CheckpointEnvelope::new(&CursorCheckpoint { next_row: 10 }).unwrap();
/// let restored: CursorCheckpoint = envelope.parse().unwrap();
/// assert_eq!(restored.next_row, 10);
/// ```
pub trait Checkpoint: serde::Serialize + serde::de::DeserializeOwned + Clone {
    /// Connector type identifier (e.g., "random", "jsonl").
    ///
    /// Stored in every envelope and validated when the envelope is parsed,
    /// so a checkpoint can never be fed to the wrong connector.
    const CONNECTOR_TYPE: &'static str;
}
