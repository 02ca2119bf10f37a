//! shardsync
//!
//! A batch transfer engine moving tables from a pluggable source to a
//! pluggable sink in parallel, resumable shards.
//!
//! # Features
//!
//! - Schema reconciliation: the source adopts the sink's columns and every
//!   table is checked column by column before data moves
//! - Sharding: each table is split into disjoint row ranges transferred by
//!   independent reader/writer pairs
//! - Checkpointing: the source and sink positions of every shard are stored
//!   periodically, so a failed job resumes where it stopped
//! - Synthetic data: the random source generates rows from per-column rules
//!
//! # Connectors
//!
//! - `random` source - [`shardsync_random_source`]
//! - `mysql` sink - [`shardsync_mysql_sink`], idempotent `INSERT IGNORE`
//! - `jsonl` sink - [`shardsync_jsonl_sink`], byte-offset checkpoints
//!
//! # CLI Usage
//!
//! ```bash
//! # Run a job, then resume it after a failure
//! shardsync run --job orders.yaml
//! shardsync run --job orders.yaml --resume
//!
//! # Show the reconciled schema without moving data
//! shardsync schema --job orders.yaml
//!
//! # Inspect stored checkpoints
//! shardsync checkpoints --job orders.yaml
//! ```

pub mod config;
pub mod pipeline;
pub mod registry;

pub use config::{ConnectorConfig, JobConfig};
pub use pipeline::{Connectors, Pipeline, RunReport, ShardFailure, ShardReport, ShardStatus};
pub use registry::{ConnectorContext, ConnectorRegistry};
