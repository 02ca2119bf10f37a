//! Connector contracts.
//!
//! A connector is either a [`Source`] or a [`Sink`]. Both own an immutable
//! [`Schema`] built once in `init()` and shared with every reader or writer
//! they spawn. Readers and writers are sequential state machines driven by a
//! single worker:
//!
//! ```text
//! open(checkpoint?) → { read_batch | write_batch }* → checkpoint()? → close()
//! ```
//!
//! Parallelism comes from running many reader/writer pairs over disjoint
//! shards, never from concurrent calls into one instance.

use std::sync::Arc;

use async_trait::async_trait;
use sync_core::{ConnectorError, RecordBatch, Schema, ShardRange, Table};

pub use checkpoint::CheckpointEnvelope;

/// Resumable position of a [`SourceReader`].
pub type SourceCheckpoint = CheckpointEnvelope;

/// Resumable position of a [`SinkWriter`].
pub type SinkCheckpoint = CheckpointEnvelope;

pub type Result<T, E = ConnectorError> = std::result::Result<T, E>;

// ============================================================================
// Source side
// ============================================================================

/// A connector that produces rows.
#[async_trait]
pub trait Source: Send + Sync {
    /// Connector type identifier (e.g., "random")
    fn connector_type(&self) -> &'static str;

    /// Build the source schema.
    ///
    /// `target` is the already initialized sink schema, for sources that
    /// take their column types from the destination.
    async fn init(&mut self, target: Option<&Schema>) -> Result<()>;

    /// The schema frozen by `init()`.
    fn schema(&self) -> Result<Arc<Schema>>;

    /// Split a table into disjoint row ranges, at most one per unit of
    /// parallelism unless the connector is configured otherwise.
    fn plan_shards(&self, table: &Table, parallelism: usize) -> Result<Vec<ShardRange>>;

    /// Create a closed reader for one shard of `table`.
    fn create_reader(&self, table: &Table, range: ShardRange) -> Result<Box<dyn SourceReader>>;
}

/// Reads one shard of one table, batch by batch.
#[async_trait]
pub trait SourceReader: Send {
    /// Acquire resources and restore the position from `checkpoint` if given.
    ///
    /// A checkpoint produced by another connector, or pointing outside this
    /// reader's range, is an `Open` error.
    async fn open(&mut self, checkpoint: Option<&SourceCheckpoint>) -> Result<()>;

    /// Next batch of up to the configured batch size.
    ///
    /// Returns `Ok(None)` once the range is exhausted.
    async fn read_batch(&mut self) -> Result<Option<RecordBatch>>;

    /// Position past every row returned so far, or `None` if there is nothing
    /// to save.
    fn checkpoint(&self) -> Result<Option<SourceCheckpoint>>;

    /// Release resources. Must not be called twice.
    async fn close(&mut self) -> Result<()>;
}

// ============================================================================
// Sink side
// ============================================================================

/// A connector that stores rows.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Connector type identifier (e.g., "mysql")
    fn connector_type(&self) -> &'static str;

    /// Discover or materialize the sink schema.
    async fn init(&mut self) -> Result<()>;

    /// The schema frozen by `init()`.
    fn schema(&self) -> Result<Arc<Schema>>;

    /// Create a closed writer for `table`.
    fn create_writer(&self, table: &Table) -> Result<Box<dyn SinkWriter>>;

    /// Release connector-wide resources once every writer is closed.
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

/// Writes batches into one table.
#[async_trait]
pub trait SinkWriter: Send {
    /// Acquire resources and restore the position from `checkpoint` if given.
    async fn open(&mut self, checkpoint: Option<&SinkCheckpoint>) -> Result<()>;

    /// Persist every record of `batch` in order.
    ///
    /// On failure no record of the batch is considered durable.
    async fn write_batch(&mut self, batch: &RecordBatch) -> Result<()>;

    /// Position past every durably written row, or `None` if the writer has
    /// no ordering state.
    fn checkpoint(&self) -> Result<Option<SinkCheckpoint>>;

    /// Release resources. Must not be called twice.
    async fn close(&mut self) -> Result<()>;
}
