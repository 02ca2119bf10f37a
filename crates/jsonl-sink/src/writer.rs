//! Append-only JSONL writer with truncate-on-resume.

use std::io::SeekFrom;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use checkpoint::CheckpointEnvelope;
use connector::SinkWriter;
use sync_core::{ConnectorError, RecordBatch, RecordType};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tracing::debug;
use uuid::Uuid;

use crate::checkpoint::JsonlSinkCheckpoint;
use crate::encode::record_to_json;
use crate::CONNECTOR_TYPE;

struct OpenFile {
    file: File,
    path: PathBuf,
    /// End of the last batch written in full
    offset: u64,
    rows: u64,
    /// A failed write may have left bytes past `offset`
    dirty: bool,
}

impl OpenFile {
    /// Cut the file back to the end of the last complete batch.
    async fn rewind(&mut self) -> std::io::Result<()> {
        self.file.set_len(self.offset).await?;
        self.file.seek(SeekFrom::Start(self.offset)).await?;
        self.dirty = false;
        Ok(())
    }

    async fn append(&mut self, buf: &[u8]) -> std::io::Result<()> {
        if self.dirty {
            self.rewind().await?;
        }
        let written = async {
            self.file.write_all(buf).await?;
            self.file.flush().await
        }
        .await;
        if written.is_err() {
            self.dirty = true;
        }
        written
    }
}

/// Writer appending the records of one table to a single file.
pub struct JsonlSinkWriter {
    dir: PathBuf,
    table: String,
    record_type: Arc<RecordType>,
    state: Option<OpenFile>,
}

impl JsonlSinkWriter {
    pub fn new(dir: PathBuf, table: String, record_type: Arc<RecordType>) -> Self {
        Self {
            dir,
            table,
            record_type,
            state: None,
        }
    }

    /// File currently written, if open.
    pub fn path(&self) -> Option<&PathBuf> {
        self.state.as_ref().map(|s| &s.path)
    }

    async fn create(&self) -> Result<OpenFile, ConnectorError> {
        let path = self
            .dir
            .join(format!("{}-{}.jsonl", self.table, Uuid::new_v4()));
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                ConnectorError::open(
                    CONNECTOR_TYPE,
                    format!("cannot create {}: {e}", path.display()),
                )
            })?;
        debug!("Created JSONL file {}", path.display());
        Ok(OpenFile {
            file,
            path,
            offset: 0,
            rows: 0,
            dirty: false,
        })
    }

    async fn reopen(&self, checkpoint: &CheckpointEnvelope) -> Result<OpenFile, ConnectorError> {
        let cp: JsonlSinkCheckpoint = checkpoint
            .parse()
            .map_err(|e| ConnectorError::open(CONNECTOR_TYPE, e.to_string()))?;
        let open_err = |message: String| ConnectorError::open(CONNECTOR_TYPE, message);

        let mut file = OpenOptions::new()
            .write(true)
            .open(&cp.path)
            .await
            .map_err(|e| open_err(format!("cannot reopen {}: {e}", cp.path.display())))?;
        let len = file
            .metadata()
            .await
            .map_err(|e| open_err(format!("cannot stat {}: {e}", cp.path.display())))?
            .len();
        if len < cp.offset {
            return Err(open_err(format!(
                "{} is {len} bytes, shorter than the checkpointed offset {}",
                cp.path.display(),
                cp.offset
            )));
        }

        // Drop whatever was written after the last checkpoint
        file.set_len(cp.offset)
            .await
            .map_err(|e| open_err(format!("cannot truncate {}: {e}", cp.path.display())))?;
        file.seek(SeekFrom::Start(cp.offset))
            .await
            .map_err(|e| open_err(format!("cannot seek {}: {e}", cp.path.display())))?;

        debug!(
            "Resuming JSONL file {} at offset {} ({} rows, discarded {} bytes)",
            cp.path.display(),
            cp.offset,
            cp.rows,
            len - cp.offset
        );
        Ok(OpenFile {
            file,
            path: cp.path,
            offset: cp.offset,
            rows: cp.rows,
            dirty: false,
        })
    }
}

#[async_trait]
impl SinkWriter for JsonlSinkWriter {
    async fn open(&mut self, checkpoint: Option<&CheckpointEnvelope>) -> Result<(), ConnectorError> {
        if self.state.is_some() {
            return Err(ConnectorError::open(CONNECTOR_TYPE, "writer is already open"));
        }
        let state = match checkpoint {
            Some(cp) => self.reopen(cp).await?,
            None => self.create().await?,
        };
        self.state = Some(state);
        Ok(())
    }

    async fn write_batch(&mut self, batch: &RecordBatch) -> Result<(), ConnectorError> {
        let table = self.table.clone();
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| ConnectorError::open(CONNECTOR_TYPE, "writer is not open"))?;

        let mut buf = Vec::new();
        for record in batch {
            serde_json::to_writer(&mut buf, &record_to_json(&self.record_type, record))
                .map_err(|e| ConnectorError::write(CONNECTOR_TYPE, &table, e))?;
            buf.push(b'\n');
        }

        state
            .append(&buf)
            .await
            .map_err(|e| ConnectorError::write(CONNECTOR_TYPE, &table, e))?;

        state.offset += buf.len() as u64;
        state.rows += batch.len() as u64;
        Ok(())
    }

    fn checkpoint(&self) -> Result<Option<CheckpointEnvelope>, ConnectorError> {
        let Some(state) = &self.state else {
            return Ok(None);
        };
        let cp = JsonlSinkCheckpoint {
            path: state.path.clone(),
            offset: state.offset,
            rows: state.rows,
        };
        CheckpointEnvelope::new(&cp)
            .map(Some)
            .map_err(|e| ConnectorError::write(CONNECTOR_TYPE, &self.table, e.to_string()))
    }

    async fn close(&mut self) -> Result<(), ConnectorError> {
        if let Some(mut state) = self.state.take() {
            if state.dirty {
                state
                    .rewind()
                    .await
                    .map_err(|e| ConnectorError::write(CONNECTOR_TYPE, &self.table, e))?;
            }
            state
                .file
                .sync_all()
                .await
                .map_err(|e| ConnectorError::write(CONNECTOR_TYPE, &self.table, e))?;
            debug!(
                "Closed JSONL file {} after {} rows",
                state.path.display(),
                state.rows
            );
        }
        Ok(())
    }
}
