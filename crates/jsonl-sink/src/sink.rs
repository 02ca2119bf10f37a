//! The JSONL sink connector.

use std::sync::Arc;

use async_trait::async_trait;
use connector::{Sink, SinkWriter};
use sync_core::{ConnectorError, RecordType, Schema, SchemaError, Table};
use tracing::info;

use crate::config::JsonlSinkConfig;
use crate::writer::JsonlSinkWriter;
use crate::CONNECTOR_TYPE;

/// Sink writing one JSON Lines file per writer.
pub struct JsonlSink {
    config: JsonlSinkConfig,
    schema: Option<Arc<Schema>>,
}

impl JsonlSink {
    pub fn new(config: JsonlSinkConfig) -> Result<Self, ConnectorError> {
        if config.tables.is_empty() {
            return Err(ConnectorError::config(
                CONNECTOR_TYPE,
                "at least one table must be declared",
            ));
        }
        Ok(Self {
            config,
            schema: None,
        })
    }

    pub fn config(&self) -> &JsonlSinkConfig {
        &self.config
    }
}

#[async_trait]
impl Sink for JsonlSink {
    fn connector_type(&self) -> &'static str {
        CONNECTOR_TYPE
    }

    async fn init(&mut self) -> Result<(), ConnectorError> {
        let mut tables = Vec::with_capacity(self.config.tables.len());
        for (name, fields) in &self.config.tables {
            if fields.is_empty() {
                return Err(SchemaError::EmptyTable(name.clone()).into());
            }
            tables.push(Table::new(name, RecordType::new(fields.clone())?));
        }
        let schema = Schema::new(tables)?;

        tokio::fs::create_dir_all(&self.config.dir)
            .await
            .map_err(|e| {
                ConnectorError::open(
                    CONNECTOR_TYPE,
                    format!(
                        "cannot create output directory {}: {e}",
                        self.config.dir.display()
                    ),
                )
            })?;

        info!(
            "JSONL sink writing {} table(s) to {}",
            schema.len(),
            self.config.dir.display()
        );
        self.schema = Some(Arc::new(schema));
        Ok(())
    }

    fn schema(&self) -> Result<Arc<Schema>, ConnectorError> {
        self.schema
            .clone()
            .ok_or_else(|| ConnectorError::NotInitialized(CONNECTOR_TYPE.to_string()))
    }

    fn create_writer(&self, table: &Table) -> Result<Box<dyn SinkWriter>, ConnectorError> {
        let schema = self.schema()?;
        let table = schema
            .get_table(&table.name)
            .ok_or_else(|| SchemaError::TableNotFound(table.name.clone()))?;
        Ok(Box::new(JsonlSinkWriter::new(
            self.config.dir.clone(),
            table.name.clone(),
            Arc::clone(&table.record_type),
        )))
    }
}
