//! Shard orchestrator.
//!
//! A run goes through these steps:
//!
//! 1. Build the sink and source from the job through the registry
//! 2. `sink.init()`, then `source.init(Some(sink_schema))`
//! 3. Reconcile: every source table must exist in the sink with identical
//!    columns, otherwise nothing moves
//! 4. Plan shards per table and run each reader/writer pair on its own task,
//!    at most `parallelism` at a time
//! 5. Store the checkpoint pair of a shard every `checkpoint_interval`
//!    batches and once more when it completes
//!
//! A failing shard stops on its own; other shards keep going. With `resume`
//! the last stored checkpoint of each shard is loaded, completed shards are
//! skipped and the others continue where they stopped.

mod report;
mod shard;

pub use report::{RunReport, ShardFailure, ShardReport, ShardStatus};

use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context};
use checkpoint::{CheckpointID, CheckpointStore, ShardCheckpoint};
use connector::{Sink, Source};
use sync_core::{Schema, ShardRange, Table};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::JobConfig;
use crate::registry::{ConnectorContext, ConnectorRegistry};
use shard::ShardTask;

/// Initialized connectors with reconciled schemas.
pub struct Connectors {
    pub source: Box<dyn Source>,
    pub sink: Box<dyn Sink>,
}

impl Connectors {
    /// The source schema, which reconciliation made equal to the sink's
    /// tables of the same names.
    pub fn schema(&self) -> anyhow::Result<Arc<Schema>> {
        Ok(self.source.schema()?)
    }
}

/// Runs one job.
pub struct Pipeline {
    job: JobConfig,
    registry: ConnectorRegistry,
    store: Arc<dyn CheckpointStore>,
}

impl Pipeline {
    /// A pipeline storing checkpoints where the job says.
    pub fn new(job: JobConfig, registry: ConnectorRegistry) -> Self {
        let store = job.checkpoints.build();
        Self {
            job,
            registry,
            store,
        }
    }

    /// Replace the checkpoint store.
    pub fn with_store(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.store = store;
        self
    }

    pub fn job(&self) -> &JobConfig {
        &self.job
    }

    pub fn store(&self) -> &Arc<dyn CheckpointStore> {
        &self.store
    }

    /// Build and initialize both connectors and reconcile their schemas.
    pub async fn prepare(&self) -> anyhow::Result<Connectors> {
        let ctx = ConnectorContext {
            batch_size: self.job.batch_size,
        };
        let mut sink = self.registry.build_sink(&self.job.sink, &ctx)?;
        let mut source = self.registry.build_source(&self.job.source, &ctx)?;

        let sink_type = sink.connector_type();
        sink.init()
            .await
            .with_context(|| format!("Failed to initialize {sink_type} sink"))?;

        let sink_schema = sink.schema()?;
        if let Err(e) = init_source(source.as_mut(), &sink_schema).await {
            if let Err(shutdown_err) = sink.shutdown().await {
                warn!("Failed to shut down {sink_type} sink: {shutdown_err}");
            }
            return Err(e);
        }
        Ok(Connectors { source, sink })
    }

    /// Transfer every shard of every table.
    ///
    /// Returns an error only when the job cannot start (configuration,
    /// initialization, reconciliation or checkpoint loading). Shard failures
    /// are reported in the [`RunReport`].
    pub async fn run(&self, resume: bool) -> anyhow::Result<RunReport> {
        let started = Instant::now();
        let connectors = self.prepare().await?;
        info!(
            "Job '{}': {} -> {}, parallelism {}, batch size {}",
            self.job.name,
            connectors.source.connector_type(),
            connectors.sink.connector_type(),
            self.job.parallelism,
            self.job.batch_size
        );

        let executed = self
            .execute(connectors.source.as_ref(), connectors.sink.as_ref(), resume)
            .await;
        if let Err(e) = connectors.sink.shutdown().await {
            warn!(
                "Failed to shut down {} sink: {e}",
                connectors.sink.connector_type()
            );
        }

        let report = RunReport {
            job: self.job.name.clone(),
            shards: executed?,
            elapsed: started.elapsed(),
        };
        info!(
            "Job '{}' finished: {} completed, {} skipped, {} failed, {} rows",
            report.job,
            report.completed(),
            report.skipped(),
            report.failures().count(),
            report.total_rows()
        );
        Ok(report)
    }

    async fn execute(
        &self,
        source: &dyn Source,
        sink: &dyn Sink,
        resume: bool,
    ) -> anyhow::Result<Vec<ShardReport>> {
        let source_schema = source.schema()?;
        let sink_schema = sink.schema()?;
        let semaphore = Arc::new(Semaphore::new(self.job.parallelism));
        let mut join_set: JoinSet<ShardReport> = JoinSet::new();
        let mut reports = Vec::new();

        for table in source_schema.tables() {
            let sink_table = sink_schema
                .get_table(&table.name)
                .ok_or_else(|| anyhow!("Table '{}' does not exist in the sink", table.name))?;
            let ranges = source
                .plan_shards(table, self.job.parallelism)
                .with_context(|| format!("Failed to plan shards of table '{}'", table.name))?;
            info!("Table '{}': {} shard(s)", table.name, ranges.len());

            for (shard_index, range) in ranges.into_iter().enumerate() {
                let previous = if resume {
                    let id = CheckpointID::new(&self.job.name, &table.name, shard_index);
                    self.store
                        .read_checkpoint(&id)
                        .await
                        .with_context(|| format!("Failed to load checkpoint {id}"))?
                } else {
                    None
                };

                let planned = self.plan_task(
                    source,
                    sink,
                    table,
                    sink_table,
                    shard_index,
                    range,
                    previous,
                );
                let task = match planned {
                    Ok(task) => task,
                    Err(report) => {
                        reports.push(report);
                        continue;
                    }
                };

                let permit = semaphore
                    .clone()
                    .acquire_owned()
                    .await
                    .context("Shard semaphore closed")?;
                join_set.spawn(async move {
                    let _permit = permit;
                    task.run().await
                });
            }
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => return Err(anyhow!("Shard task did not complete: {e}")),
            }
        }

        reports.sort_by(|a, b| {
            (a.table.as_str(), a.shard_index).cmp(&(b.table.as_str(), b.shard_index))
        });
        Ok(reports)
    }

    /// Pair a reader with a writer for one shard, or settle the shard
    /// without running it.
    #[allow(clippy::too_many_arguments)]
    fn plan_task(
        &self,
        source: &dyn Source,
        sink: &dyn Sink,
        table: &Table,
        sink_table: &Table,
        shard_index: usize,
        range: ShardRange,
        previous: Option<ShardCheckpoint>,
    ) -> Result<ShardTask, ShardReport> {
        let settled = |status: ShardStatus, rows: u64| ShardReport {
            table: table.name.clone(),
            shard_index,
            range,
            rows_transferred: rows,
            batches: 0,
            status,
        };
        let failed = |previous: Option<ShardCheckpoint>, error: anyhow::Error| {
            let rows = previous.as_ref().map_or(0, |cp| cp.rows_transferred);
            settled(
                ShardStatus::Failed(ShardFailure {
                    table: table.name.clone(),
                    shard_index,
                    range,
                    last_checkpoint: previous,
                    error,
                }),
                rows,
            )
        };

        if let Some(cp) = &previous {
            if cp.range != range {
                let error = anyhow!(
                    "stored checkpoint covers {} but the shard is now planned as {range}",
                    cp.range
                );
                return Err(failed(previous, error));
            }
            if cp.completed {
                info!(
                    "Skipping completed shard {}[{}] {range}",
                    table.name, shard_index
                );
                return Err(settled(ShardStatus::Skipped, cp.rows_transferred));
            }
            info!(
                "Resuming shard {}[{}] {range} after {} rows",
                table.name, shard_index, cp.rows_transferred
            );
        }

        let pair = source
            .create_reader(table, range)
            .context("Failed to create reader")
            .and_then(|reader| {
                let writer = sink
                    .create_writer(sink_table)
                    .context("Failed to create writer")?;
                Ok((reader, writer))
            });
        let (reader, writer) = match pair {
            Ok(pair) => pair,
            Err(error) => return Err(failed(previous, error)),
        };

        Ok(ShardTask {
            job: self.job.name.clone(),
            table: table.name.clone(),
            shard_index,
            range,
            reader,
            writer,
            store: Arc::clone(&self.store),
            checkpoint_interval: self.job.checkpoint_interval,
            resume_from: previous,
        })
    }
}

async fn init_source(source: &mut dyn Source, target: &Schema) -> anyhow::Result<()> {
    let source_type = source.connector_type();
    source
        .init(Some(target))
        .await
        .with_context(|| format!("Failed to initialize {source_type} source"))?;
    source
        .schema()?
        .reconcile_with(target)
        .context("Source and sink schemas do not match")?;
    Ok(())
}
