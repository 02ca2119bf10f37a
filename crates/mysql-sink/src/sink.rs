//! The MySQL sink connector.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use connector::{Sink, SinkWriter};
use mysql_async::Pool;
use sync_core::{ConnectorError, Schema, SchemaError, Table};
use tracing::{info, warn};

use crate::config::MySQLSinkConfig;
use crate::schema::{build_schema, discover_columns, insert_template};
use crate::writer::MySQLSinkWriter;
use crate::CONNECTOR_TYPE;

/// Sink writing into existing MySQL tables with `INSERT IGNORE`.
///
/// `init()` discovers every table of the connected database. Re-delivering a
/// batch after a resume is harmless: rows whose key already exists are
/// skipped by the server.
pub struct MySQLSink {
    config: MySQLSinkConfig,
    pool: Option<Pool>,
    schema: Option<Arc<Schema>>,
    /// Insertion template per table
    templates: HashMap<String, Arc<str>>,
}

impl MySQLSink {
    pub fn new(config: MySQLSinkConfig) -> Result<Self, ConnectorError> {
        // Reject malformed URLs before anything connects
        config.opts()?;
        Ok(Self {
            config,
            pool: None,
            schema: None,
            templates: HashMap::new(),
        })
    }

    /// Insertion template of a discovered table.
    pub fn template(&self, table: &str) -> Option<&str> {
        self.templates.get(table).map(|t| t.as_ref())
    }

    fn pool(&self) -> Result<&Pool, ConnectorError> {
        self.pool
            .as_ref()
            .ok_or_else(|| ConnectorError::NotInitialized(CONNECTOR_TYPE.to_string()))
    }
}

#[async_trait]
impl Sink for MySQLSink {
    fn connector_type(&self) -> &'static str {
        CONNECTOR_TYPE
    }

    async fn init(&mut self) -> Result<(), ConnectorError> {
        let pool = Pool::new(self.config.opts()?);
        let mut conn = pool
            .get_conn()
            .await
            .map_err(|e| ConnectorError::open(CONNECTOR_TYPE, e.to_string()))?;

        let columns = discover_columns(&mut conn).await.map_err(|e| {
            ConnectorError::open(CONNECTOR_TYPE, format!("schema discovery failed: {e}"))
        })?;
        drop(conn);

        let schema = build_schema(&columns)?;
        if schema.is_empty() {
            warn!("MySQL sink discovered no tables");
        }

        self.templates = schema
            .tables()
            .iter()
            .map(|table| (table.name.clone(), Arc::from(insert_template(table))))
            .collect();
        info!(
            "MySQL sink discovered {} table(s): {:?}",
            schema.len(),
            schema.table_names()
        );

        self.schema = Some(Arc::new(schema));
        self.pool = Some(pool);
        Ok(())
    }

    fn schema(&self) -> Result<Arc<Schema>, ConnectorError> {
        self.schema
            .clone()
            .ok_or_else(|| ConnectorError::NotInitialized(CONNECTOR_TYPE.to_string()))
    }

    fn create_writer(&self, table: &Table) -> Result<Box<dyn SinkWriter>, ConnectorError> {
        let pool = self.pool()?;
        let template = self
            .templates
            .get(&table.name)
            .ok_or_else(|| SchemaError::TableNotFound(table.name.clone()))?;

        Ok(Box::new(MySQLSinkWriter::new(
            table.name.clone(),
            template.clone(),
            pool.clone(),
        )))
    }

    async fn shutdown(&self) -> Result<(), ConnectorError> {
        if let Some(pool) = &self.pool {
            pool.clone().disconnect().await.map_err(|e| {
                ConnectorError::open(CONNECTOR_TYPE, format!("disconnect failed: {e}"))
            })?;
        }
        Ok(())
    }
}
