//! A sink that accepts and discards rows, failing one table on demand.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use connector::{Sink, SinkCheckpoint, SinkWriter};
use serde::Deserialize;
use shardsync::{ConnectorConfig, ConnectorContext, ConnectorRegistry};
use sync_core::{ConnectorError, Field, RecordBatch, RecordType, Schema, Table};

pub const FLAKY: &str = "flaky";

#[derive(Debug, Deserialize)]
pub struct FlakySinkConfig {
    tables: BTreeMap<String, Vec<Field>>,
    fail_table: String,
    /// Batches each writer of `fail_table` accepts before failing
    fail_after: usize,
}

pub struct FlakySink {
    config: FlakySinkConfig,
    schema: Option<Arc<Schema>>,
}

struct FlakyWriter {
    table: String,
    fail_after: Option<usize>,
    written: usize,
}

fn flaky_sink(config: &ConnectorConfig, _ctx: &ConnectorContext) -> anyhow::Result<Box<dyn Sink>> {
    Ok(Box::new(FlakySink {
        config: config.decode()?,
        schema: None,
    }))
}

/// The builtin registry plus the `flaky` sink.
pub fn registry() -> ConnectorRegistry {
    let mut registry = ConnectorRegistry::with_builtin();
    registry.register_sink(FLAKY, flaky_sink);
    registry
}

#[async_trait]
impl Sink for FlakySink {
    fn connector_type(&self) -> &'static str {
        FLAKY
    }

    async fn init(&mut self) -> Result<(), ConnectorError> {
        let tables = self
            .config
            .tables
            .iter()
            .map(|(name, fields)| -> Result<Table, ConnectorError> {
                Ok(Table::new(name, RecordType::new(fields.clone())?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.schema = Some(Arc::new(Schema::new(tables)?));
        Ok(())
    }

    fn schema(&self) -> Result<Arc<Schema>, ConnectorError> {
        self.schema
            .clone()
            .ok_or_else(|| ConnectorError::NotInitialized(FLAKY.to_string()))
    }

    fn create_writer(&self, table: &Table) -> Result<Box<dyn SinkWriter>, ConnectorError> {
        let fail_after = (table.name == self.config.fail_table).then_some(self.config.fail_after);
        Ok(Box::new(FlakyWriter {
            table: table.name.clone(),
            fail_after,
            written: 0,
        }))
    }
}

#[async_trait]
impl SinkWriter for FlakyWriter {
    async fn open(&mut self, _checkpoint: Option<&SinkCheckpoint>) -> Result<(), ConnectorError> {
        Ok(())
    }

    async fn write_batch(&mut self, _batch: &RecordBatch) -> Result<(), ConnectorError> {
        if self.fail_after.is_some_and(|n| self.written >= n) {
            return Err(ConnectorError::write(FLAKY, &self.table, "injected failure"));
        }
        self.written += 1;
        Ok(())
    }

    fn checkpoint(&self) -> Result<Option<SinkCheckpoint>, ConnectorError> {
        Ok(None)
    }

    async fn close(&mut self) -> Result<(), ConnectorError> {
        Ok(())
    }
}
