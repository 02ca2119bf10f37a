//! The random source connector.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use connector::{Source, SourceReader};
use sync_core::{
    ConnectorError, Field, RecordType, Schema, SchemaError, ShardRange, Table,
};
use tracing::{debug, warn};

use crate::config::{RandomSourceConfig, RandomTableConfig};
use crate::reader::RandomSourceReader;
use crate::CONNECTOR_TYPE;

/// Source that manufactures rows from per-column rules.
///
/// The schema is built in [`Source::init`]: a table that already exists in
/// the sink adopts the sink's columns, anything else uses the types declared
/// in the configuration.
pub struct RandomSource {
    config: RandomSourceConfig,
    batch_size: usize,
    schema: Option<Arc<Schema>>,
    /// Rule source per column, per table
    rules: HashMap<String, Arc<HashMap<String, String>>>,
}

impl RandomSource {
    pub fn new(config: RandomSourceConfig, batch_size: usize) -> Result<Self, ConnectorError> {
        if batch_size == 0 {
            return Err(ConnectorError::config(
                CONNECTOR_TYPE,
                "batch_size must be greater than zero",
            ));
        }
        if config.tables.is_empty() {
            return Err(ConnectorError::config(
                CONNECTOR_TYPE,
                "at least one table must be configured",
            ));
        }

        let rules = config
            .tables
            .iter()
            .map(|(table, table_config)| {
                let columns = table_config
                    .columns
                    .iter()
                    .filter_map(|c| c.rule.clone().map(|rule| (c.name.clone(), rule)))
                    .collect();
                (table.clone(), Arc::new(columns))
            })
            .collect();

        Ok(Self {
            config,
            batch_size,
            schema: None,
            rules,
        })
    }

    pub fn config(&self) -> &RandomSourceConfig {
        &self.config
    }

    fn table_config(&self, table: &str) -> Result<&RandomTableConfig, ConnectorError> {
        self.config
            .tables
            .get(table)
            .ok_or_else(|| SchemaError::TableNotFound(table.to_string()).into())
    }
}

/// Columns of a table that the sink already has.
fn adopt_target_fields(
    name: &str,
    table_config: &RandomTableConfig,
    target: &Table,
) -> Result<Vec<Field>, SchemaError> {
    for column in &table_config.columns {
        match target.record_type.get_field(&column.name) {
            Some(field) => {
                if let Some(declared) = column.column_type {
                    if declared != field.field_type {
                        return Err(SchemaError::Mismatch {
                            table: name.to_string(),
                            reason: format!(
                                "column '{}' is declared {} but the sink column is {}",
                                column.name, declared, field.field_type
                            ),
                        });
                    }
                }
            }
            None => warn!(
                "Ignoring settings for column '{}.{}': the sink table has no such column",
                name, column.name
            ),
        }
    }
    Ok(target.record_type.fields().to_vec())
}

/// Columns of a table declared only in configuration.
fn declared_fields(name: &str, table_config: &RandomTableConfig) -> Result<Vec<Field>, SchemaError> {
    if table_config.columns.is_empty() {
        return Err(SchemaError::EmptyTable(name.to_string()));
    }
    table_config
        .columns
        .iter()
        .map(|column| {
            column
                .column_type
                .map(|t| Field::new(&column.name, t))
                .ok_or_else(|| SchemaError::UnresolvedColumnType {
                    table: name.to_string(),
                    column: column.name.clone(),
                })
        })
        .collect()
}

#[async_trait]
impl Source for RandomSource {
    fn connector_type(&self) -> &'static str {
        CONNECTOR_TYPE
    }

    async fn init(&mut self, target: Option<&Schema>) -> Result<(), ConnectorError> {
        let mut tables = Vec::with_capacity(self.config.tables.len());
        for (name, table_config) in &self.config.tables {
            let fields = match target.and_then(|schema| schema.get_table(name)) {
                Some(target_table) => adopt_target_fields(name, table_config, target_table)?,
                None => declared_fields(name, table_config)?,
            };
            tables.push(Table::new(name, RecordType::new(fields)?));
        }

        let schema = Schema::new(tables)?;
        debug!(
            "Random source initialized with tables: {:?}",
            schema.table_names()
        );
        self.schema = Some(Arc::new(schema));
        Ok(())
    }

    fn schema(&self) -> Result<Arc<Schema>, ConnectorError> {
        self.schema
            .clone()
            .ok_or_else(|| ConnectorError::NotInitialized(CONNECTOR_TYPE.to_string()))
    }

    fn plan_shards(
        &self,
        table: &Table,
        parallelism: usize,
    ) -> Result<Vec<ShardRange>, ConnectorError> {
        let table_config = self.table_config(&table.name)?;
        let shards = table_config.shards.unwrap_or(parallelism).max(1);
        Ok(ShardRange::split(table_config.rows, shards))
    }

    fn create_reader(
        &self,
        table: &Table,
        range: ShardRange,
    ) -> Result<Box<dyn SourceReader>, ConnectorError> {
        let schema = self.schema()?;
        let table = schema
            .get_table(&table.name)
            .ok_or_else(|| SchemaError::TableNotFound(table.name.clone()))?
            .clone();
        let rules = self.rules.get(&table.name).cloned().unwrap_or_default();

        Ok(Box::new(RandomSourceReader::new(
            table,
            range,
            self.batch_size,
            rules,
            self.config.seed,
        )))
    }
}
