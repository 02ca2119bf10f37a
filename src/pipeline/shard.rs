//! Transfer of one shard from its reader to its writer.

use std::sync::Arc;

use anyhow::Context;
use checkpoint::{CheckpointStore, ShardCheckpoint};
use chrono::Utc;
use connector::{SinkWriter, SourceReader};
use sync_core::ShardRange;
use tracing::{debug, error, info, warn};

use super::report::{ShardFailure, ShardReport, ShardStatus};

#[derive(Debug, Default)]
struct Progress {
    rows: u64,
    batches: u64,
    last_checkpoint: Option<ShardCheckpoint>,
}

/// A reader/writer pair bound to one shard, driven by a single task.
pub(crate) struct ShardTask {
    pub job: String,
    pub table: String,
    pub shard_index: usize,
    pub range: ShardRange,
    pub reader: Box<dyn SourceReader>,
    pub writer: Box<dyn SinkWriter>,
    pub store: Arc<dyn CheckpointStore>,
    pub checkpoint_interval: usize,
    /// Stored checkpoint to resume from
    pub resume_from: Option<ShardCheckpoint>,
}

impl ShardTask {
    pub async fn run(mut self) -> ShardReport {
        let mut progress = Progress {
            rows: self
                .resume_from
                .as_ref()
                .map_or(0, |cp| cp.rows_transferred),
            batches: 0,
            last_checkpoint: self.resume_from.clone(),
        };

        let transferred = self.transfer(&mut progress).await;
        let status = match self.finish(transferred, &mut progress).await {
            Ok(()) => {
                info!(
                    "Shard {}[{}] {} completed: {} rows",
                    self.table, self.shard_index, self.range, progress.rows
                );
                ShardStatus::Completed
            }
            Err(error) => {
                error!(
                    "Shard {}[{}] {} failed: {error:#}",
                    self.table, self.shard_index, self.range
                );
                ShardStatus::Failed(ShardFailure {
                    table: self.table.clone(),
                    shard_index: self.shard_index,
                    range: self.range,
                    last_checkpoint: progress.last_checkpoint.clone(),
                    error,
                })
            }
        };

        ShardReport {
            table: self.table,
            shard_index: self.shard_index,
            range: self.range,
            rows_transferred: progress.rows,
            batches: progress.batches,
            status,
        }
    }

    /// Pump batches until the reader is exhausted; returns the final
    /// checkpoint, not yet stored.
    async fn transfer(&mut self, progress: &mut Progress) -> anyhow::Result<ShardCheckpoint> {
        let (source_cp, sink_cp) = match &self.resume_from {
            Some(cp) => (cp.source.clone(), cp.sink.clone()),
            None => (None, None),
        };

        self.reader
            .open(source_cp.as_ref())
            .await
            .context("Failed to open reader")?;
        self.writer
            .open(sink_cp.as_ref())
            .await
            .context("Failed to open writer")?;

        let mut pending = 0;
        while let Some(batch) = self
            .reader
            .read_batch()
            .await
            .context("Failed to read batch")?
        {
            self.writer
                .write_batch(&batch)
                .await
                .context("Failed to write batch")?;
            progress.rows += batch.len() as u64;
            progress.batches += 1;
            pending += 1;

            if pending >= self.checkpoint_interval {
                let cp = self.snapshot(progress.rows, false)?;
                self.store
                    .store_checkpoint(&cp)
                    .await
                    .with_context(|| format!("Failed to store checkpoint {}", cp.id()))?;
                debug!("Stored checkpoint {} at {} rows", cp.id(), progress.rows);
                progress.last_checkpoint = Some(cp);
                pending = 0;
            }
        }

        self.snapshot(progress.rows, true)
    }

    /// Close both sides, then persist the final checkpoint if everything
    /// before it succeeded.
    async fn finish(
        &mut self,
        transferred: anyhow::Result<ShardCheckpoint>,
        progress: &mut Progress,
    ) -> anyhow::Result<()> {
        let reader_closed = self.reader.close().await;
        let writer_closed = self.writer.close().await;

        let final_cp = match transferred {
            Ok(cp) => cp,
            Err(e) => {
                if let Err(close_err) = reader_closed {
                    warn!(
                        "Failed to close reader of {}[{}]: {close_err}",
                        self.table, self.shard_index
                    );
                }
                if let Err(close_err) = writer_closed {
                    warn!(
                        "Failed to close writer of {}[{}]: {close_err}",
                        self.table, self.shard_index
                    );
                }
                return Err(e);
            }
        };

        reader_closed.context("Failed to close reader")?;
        writer_closed.context("Failed to close writer")?;
        self.store
            .store_checkpoint(&final_cp)
            .await
            .with_context(|| format!("Failed to store final checkpoint {}", final_cp.id()))?;
        progress.last_checkpoint = Some(final_cp);
        Ok(())
    }

    fn snapshot(&self, rows: u64, completed: bool) -> anyhow::Result<ShardCheckpoint> {
        Ok(ShardCheckpoint {
            job: self.job.clone(),
            table: self.table.clone(),
            shard_index: self.shard_index,
            range: self.range,
            source: self
                .reader
                .checkpoint()
                .context("Failed to checkpoint reader")?,
            sink: self
                .writer
                .checkpoint()
                .context("Failed to checkpoint writer")?,
            rows_transferred: rows,
            completed,
            created_at: Utc::now(),
        })
    }
}
