//! Writer inserting batches into one MySQL table.

use std::sync::Arc;

use async_trait::async_trait;
use connector::{SinkCheckpoint, SinkWriter};
use mysql_async::prelude::*;
use mysql_async::{Conn, Pool, TxOpts};
use sync_core::{ConnectorError, RecordBatch};
use tracing::debug;

use crate::types::to_mysql_value;
use crate::CONNECTOR_TYPE;

/// Inserts each batch in one transaction through the table's template.
///
/// The writer keeps no ordering state, so it has nothing to checkpoint:
/// resuming re-delivers from the source checkpoint and duplicate keys are
/// skipped by `INSERT IGNORE`.
pub struct MySQLSinkWriter {
    table: String,
    template: Arc<str>,
    pool: Pool,
    conn: Option<Conn>,
}

impl MySQLSinkWriter {
    pub fn new(table: String, template: Arc<str>, pool: Pool) -> Self {
        Self {
            table,
            template,
            pool,
            conn: None,
        }
    }

    fn write_error(&self, e: mysql_async::Error) -> ConnectorError {
        ConnectorError::write(CONNECTOR_TYPE, self.table.clone(), e)
    }
}

#[async_trait]
impl SinkWriter for MySQLSinkWriter {
    async fn open(&mut self, checkpoint: Option<&SinkCheckpoint>) -> Result<(), ConnectorError> {
        if let Some(checkpoint) = checkpoint {
            return Err(ConnectorError::open(
                CONNECTOR_TYPE,
                format!(
                    "unexpected '{}' checkpoint: the mysql writer keeps no position",
                    checkpoint.connector_type()
                ),
            ));
        }
        let conn = self
            .pool
            .get_conn()
            .await
            .map_err(|e| ConnectorError::open(CONNECTOR_TYPE, e.to_string()))?;
        self.conn = Some(conn);
        Ok(())
    }

    async fn write_batch(&mut self, batch: &RecordBatch) -> Result<(), ConnectorError> {
        if batch.is_empty() {
            return Ok(());
        }
        let params: Vec<Vec<mysql_async::Value>> = batch
            .iter()
            .map(|record| record.values().iter().map(to_mysql_value).collect())
            .collect();

        let template = self.template.clone();
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| ConnectorError::open(CONNECTOR_TYPE, "writer is not open"))?;
        let result = async {
            let mut tx = conn.start_transaction(TxOpts::default()).await?;
            tx.exec_batch(template.as_ref(), params).await?;
            tx.commit().await
        }
        .await;
        result.map_err(|e| self.write_error(e))?;

        debug!("Inserted {} row(s) into {}", batch.len(), self.table);
        Ok(())
    }

    fn checkpoint(&self) -> Result<Option<SinkCheckpoint>, ConnectorError> {
        Ok(None)
    }

    async fn close(&mut self) -> Result<(), ConnectorError> {
        // Dropping the connection returns it to the pool
        self.conn = None;
        Ok(())
    }
}
