//! Outcome of a pipeline run.

use std::fmt;
use std::time::Duration;

use checkpoint::ShardCheckpoint;
use sync_core::ShardRange;

/// Why a shard stopped before exhaustion.
#[derive(Debug)]
pub struct ShardFailure {
    pub table: String,
    pub shard_index: usize,
    pub range: ShardRange,
    /// Last checkpoint stored for the shard; a resumed run restarts here
    pub last_checkpoint: Option<ShardCheckpoint>,
    pub error: anyhow::Error,
}

impl fmt::Display for ShardFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shard {} of table '{}' {} failed",
            self.shard_index, self.table, self.range
        )?;
        match &self.last_checkpoint {
            Some(cp) => write!(f, " after {} rows", cp.rows_transferred)?,
            None => write!(f, " before its first checkpoint")?,
        }
        write!(f, ": {:#}", self.error)
    }
}

#[derive(Debug)]
pub enum ShardStatus {
    Completed,
    /// Already completed by an earlier run
    Skipped,
    Failed(ShardFailure),
}

/// Per-shard outcome.
#[derive(Debug)]
pub struct ShardReport {
    pub table: String,
    pub shard_index: usize,
    pub range: ShardRange,
    /// Rows transferred across every run of this shard
    pub rows_transferred: u64,
    /// Batches moved during this run
    pub batches: u64,
    pub status: ShardStatus,
}

impl ShardReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, ShardStatus::Failed(_))
    }

    pub fn failure(&self) -> Option<&ShardFailure> {
        match &self.status {
            ShardStatus::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Outcome of every shard of a job, ordered by table and shard index.
#[derive(Debug)]
pub struct RunReport {
    pub job: String,
    pub shards: Vec<ShardReport>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn total_rows(&self) -> u64 {
        self.shards.iter().map(|s| s.rows_transferred).sum()
    }

    pub fn completed(&self) -> usize {
        self.count(|s| matches!(s, ShardStatus::Completed))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, ShardStatus::Skipped))
    }

    pub fn failures(&self) -> impl Iterator<Item = &ShardFailure> {
        self.shards.iter().filter_map(ShardReport::failure)
    }

    pub fn is_success(&self) -> bool {
        !self.shards.iter().any(ShardReport::is_failed)
    }

    fn count(&self, pred: impl Fn(&ShardStatus) -> bool) -> usize {
        self.shards.iter().filter(|s| pred(&s.status)).count()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Job '{}': {} shard(s) completed, {} skipped, {} failed, {} rows in {:.2?}",
            self.job,
            self.completed(),
            self.skipped(),
            self.failures().count(),
            self.total_rows(),
            self.elapsed
        )?;
        for shard in &self.shards {
            let status = match &shard.status {
                ShardStatus::Completed => "completed",
                ShardStatus::Skipped => "skipped",
                ShardStatus::Failed(_) => "FAILED",
            };
            writeln!(
                f,
                "  {}[{}] {}: {} ({} rows, {} batches)",
                shard.table,
                shard.shard_index,
                shard.range,
                status,
                shard.rows_transferred,
                shard.batches
            )?;
        }
        for failure in self.failures() {
            writeln!(f, "  {failure}")?;
        }
        Ok(())
    }
}
