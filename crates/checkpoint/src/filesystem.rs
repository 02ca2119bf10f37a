//! Filesystem-based checkpoint storage implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::store::{CheckpointID, CheckpointStore};
use crate::ShardCheckpoint;

/// Filesystem implementation of CheckpointStore trait.
///
/// Stores one JSON file per shard, laid out as
/// `<dir>/<job>/<table>/shard-<index>.json`. Each write replaces the
/// previous file atomically through a temporary file and a rename.
pub struct FilesystemStore {
    dir: PathBuf,
}

impl FilesystemStore {
    /// Create a new FilesystemStore with the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Get the directory path.
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn job_dir(&self, job: &str) -> PathBuf {
        self.dir.join(sanitize(job))
    }

    fn checkpoint_path(&self, id: &CheckpointID) -> PathBuf {
        self.job_dir(&id.job)
            .join(sanitize(&id.table))
            .join(format!("shard-{:05}.json", id.shard_index))
    }
}

/// Encode a name as a single path component.
///
/// Bytes outside `[A-Za-z0-9.-]` become `_XX` hex escapes, `_` included, so
/// distinct names never share a directory.
fn sanitize(name: &str) -> String {
    // "", "." and ".." would resolve outside the intended directory
    if name.is_empty() {
        return "_".to_string();
    }
    let all_dots = name.bytes().all(|b| b == b'.');

    let mut out = String::with_capacity(name.len());
    for byte in name.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' => out.push(byte as char),
            b'.' if !all_dots => out.push('.'),
            _ => out.push_str(&format!("_{byte:02X}")),
        }
    }
    out
}

fn read_file(path: &Path) -> Result<ShardCheckpoint> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read checkpoint file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse checkpoint file {}", path.display()))
}

#[async_trait]
impl CheckpointStore for FilesystemStore {
    async fn store_checkpoint(&self, checkpoint: &ShardCheckpoint) -> Result<()> {
        let path = self.checkpoint_path(&checkpoint.id());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(checkpoint)?)?;
        std::fs::rename(&tmp, &path)?;
        tracing::debug!(
            "Stored checkpoint for shard {} to {}",
            checkpoint.id(),
            path.display()
        );
        Ok(())
    }

    async fn read_checkpoint(&self, id: &CheckpointID) -> Result<Option<ShardCheckpoint>> {
        let path = self.checkpoint_path(id);
        if !path.exists() {
            return Ok(None);
        }
        read_file(&path).map(Some)
    }

    async fn list_checkpoints(&self, job: &str) -> Result<Vec<ShardCheckpoint>> {
        let job_dir = self.job_dir(job);
        if !job_dir.exists() {
            return Ok(Vec::new());
        }

        let mut checkpoints = Vec::new();
        for table_entry in std::fs::read_dir(&job_dir)? {
            let table_entry = table_entry?;
            if !table_entry.file_type()?.is_dir() {
                continue;
            }
            for entry in std::fs::read_dir(table_entry.path())? {
                let path = entry?.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    checkpoints.push(read_file(&path)?);
                }
            }
        }

        checkpoints.sort_by(|a, b| {
            a.table
                .cmp(&b.table)
                .then(a.shard_index.cmp(&b.shard_index))
        });
        Ok(checkpoints)
    }
}
