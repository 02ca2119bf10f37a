//! Checkpoint storage configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::{CheckpointStore, FilesystemStore, NullStore};

/// Default directory for filesystem checkpoints.
pub const DEFAULT_CHECKPOINT_DIR: &str = ".shardsync-checkpoints";

/// Where shard checkpoints are persisted.
///
/// ```yaml
/// checkpoints:
///   storage: filesystem
///   dir: /var/lib/shardsync
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "storage", rename_all = "snake_case")]
pub enum CheckpointStorage {
    /// Checkpoints are not persisted; a failed job restarts from scratch.
    Disabled,
    /// One JSON file per shard under `dir`.
    Filesystem {
        #[serde(default = "default_dir")]
        dir: PathBuf,
    },
}

fn default_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CHECKPOINT_DIR)
}

impl Default for CheckpointStorage {
    fn default() -> Self {
        Self::Filesystem { dir: default_dir() }
    }
}

impl CheckpointStorage {
    /// Build the store described by this configuration.
    pub fn build(&self) -> Arc<dyn CheckpointStore> {
        match self {
            Self::Disabled => Arc::new(NullStore),
            Self::Filesystem { dir } => Arc::new(FilesystemStore::new(dir.clone())),
        }
    }

    /// Whether checkpoints survive the process.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}
