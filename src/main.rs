//! Command-line interface for shardsync
//!
//! # Usage Examples
//!
//! ```bash
//! # Transfer every table of the job
//! shardsync run --job orders.yaml
//!
//! # Continue a failed run from its stored checkpoints
//! shardsync run --job orders.yaml --resume
//!
//! # Override the job's parallelism
//! shardsync run --job orders.yaml --parallelism 8
//!
//! # Print the reconciled schema
//! shardsync schema --job orders.yaml
//!
//! # List stored shard checkpoints
//! shardsync checkpoints --job orders.yaml
//! ```
//!
//! Logging is controlled with `RUST_LOG`, e.g. `RUST_LOG=shardsync=debug,info`.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use shardsync::{ConnectorRegistry, JobConfig, Pipeline};

#[derive(Parser)]
#[command(name = "shardsync")]
#[command(about = "Move tables from a source to a sink in parallel, resumable shards")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a job
    Run {
        /// Job file (YAML)
        #[arg(long, env = "SHARDSYNC_JOB")]
        job: PathBuf,

        /// Resume from stored checkpoints, skipping completed shards
        #[arg(long)]
        resume: bool,

        /// Override the job's parallelism
        #[arg(long)]
        parallelism: Option<usize>,

        /// Override the job's batch size
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Initialize both connectors and print the reconciled schema
    Schema {
        /// Job file (YAML)
        #[arg(long, env = "SHARDSYNC_JOB")]
        job: PathBuf,
    },

    /// List the stored checkpoints of a job
    Checkpoints {
        /// Job file (YAML)
        #[arg(long, env = "SHARDSYNC_JOB")]
        job: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            job,
            resume,
            parallelism,
            batch_size,
        } => {
            let mut job = JobConfig::from_file(&job)?;
            if let Some(parallelism) = parallelism {
                job.parallelism = parallelism;
            }
            if let Some(batch_size) = batch_size {
                job.batch_size = batch_size;
            }
            job.validate()?;
            if resume && !job.checkpoints.is_enabled() {
                tracing::warn!("Checkpoints are disabled; --resume starts from scratch");
            }

            let pipeline = Pipeline::new(job, ConnectorRegistry::with_builtin());
            let report = pipeline.run(resume).await?;
            print!("{report}");
            let failed = report.failures().count();
            if failed > 0 {
                bail!("{failed} shard(s) failed; rerun with --resume to continue");
            }
        }
        Commands::Schema { job } => {
            let job = JobConfig::from_file(&job)?;
            let pipeline = Pipeline::new(job, ConnectorRegistry::with_builtin());
            let connectors = pipeline.prepare().await?;
            let schema = connectors.schema()?;
            for table in schema.tables() {
                println!("{}", table.name);
                for field in table.record_type.fields() {
                    println!("  {}: {}", field.name, field.field_type);
                }
            }
            connectors
                .sink
                .shutdown()
                .await
                .context("Failed to shut down sink")?;
        }
        Commands::Checkpoints { job } => {
            let job = JobConfig::from_file(&job)?;
            let pipeline = Pipeline::new(job, ConnectorRegistry::with_builtin());
            let checkpoints = pipeline
                .store()
                .list_checkpoints(&pipeline.job().name)
                .await
                .context("Failed to list checkpoints")?;
            if checkpoints.is_empty() {
                println!("No checkpoints stored for job '{}'", pipeline.job().name);
            }
            for cp in checkpoints {
                println!(
                    "{} {} rows={} completed={} at {}",
                    cp.id(),
                    cp.range,
                    cp.rows_transferred,
                    cp.completed,
                    cp.created_at.to_rfc3339()
                );
            }
        }
    }

    Ok(())
}
