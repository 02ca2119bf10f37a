//! Job files.
//!
//! A job names one source and one sink plus the knobs of the shard
//! orchestrator. Connector sections are kept as raw YAML and decoded by the
//! connector factory selected through their `type` key.

use std::path::Path;

use anyhow::{bail, Context};
use checkpoint::CheckpointStorage;
use serde::{Deserialize, Serialize};

fn default_batch_size() -> usize {
    1000
}

fn default_parallelism() -> usize {
    4
}

fn default_checkpoint_interval() -> usize {
    1
}

/// One source to sink transfer.
///
/// ```yaml
/// name: orders-load
/// batch_size: 1000
/// parallelism: 4
/// checkpoint_interval: 1
/// checkpoints:
///   storage: filesystem
///   dir: .shardsync-checkpoints
/// source:
///   type: random
///   tables: { ... }
/// sink:
///   type: jsonl
///   dir: ./out
///   tables: { ... }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Job name; checkpoints are stored under it
    pub name: String,

    /// Maximum rows per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum number of shards transferring at once
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// Batches between two stored checkpoints of a shard
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: usize,

    #[serde(default)]
    pub checkpoints: CheckpointStorage,

    pub source: ConnectorConfig,

    pub sink: ConnectorConfig,
}

/// A connector section: its type plus connector-specific options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Registered connector type (e.g., "random", "mysql", "jsonl")
    #[serde(rename = "type")]
    pub kind: String,

    /// Every other key of the section
    #[serde(flatten)]
    pub options: serde_yaml::Mapping,
}

impl ConnectorConfig {
    pub fn new(kind: impl Into<String>, options: serde_yaml::Mapping) -> Self {
        Self {
            kind: kind.into(),
            options,
        }
    }

    /// Decode the options into a connector's own configuration type.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> anyhow::Result<T> {
        serde_yaml::from_value(serde_yaml::Value::Mapping(self.options.clone()))
            .with_context(|| format!("Invalid options for connector '{}'", self.kind))
    }
}

impl JobConfig {
    /// Load and validate a job file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to load job file {}", path.display()))
    }

    /// Parse and validate a job from YAML text.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let job: JobConfig = serde_yaml::from_str(content).context("Failed to parse job YAML")?;
        job.validate()?;
        Ok(job)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            bail!("Job name must not be empty");
        }
        if self.batch_size == 0 {
            bail!("batch_size must be greater than zero");
        }
        if self.parallelism == 0 {
            bail!("parallelism must be greater than zero");
        }
        if self.checkpoint_interval == 0 {
            bail!("checkpoint_interval must be greater than zero");
        }
        Ok(())
    }
}
