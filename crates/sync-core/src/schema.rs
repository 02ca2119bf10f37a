//! Schema definitions shared by every connector.
//!
//! ## Type Hierarchy
//!
//! - `Field` - A named, typed column
//! - `RecordType` - Ordered fields; the order defines positional indexing
//! - `Table` - A named record type
//! - `Schema` - Tables keyed by unique name
//!
//! A `Schema` is built once when a connector initializes and is shared
//! read-only (behind an `Arc`) by every reader and writer spawned from it.

use crate::types::BasicType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for schema construction, discovery and reconciliation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// Two fields of one record type share a name
    #[error("Duplicate field '{0}' in record type")]
    DuplicateField(String),

    /// Two tables of one schema share a name
    #[error("Duplicate table '{0}' in schema")]
    DuplicateTable(String),

    /// Table not found in schema
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// A table was declared without any column
    #[error("Table '{0}' has no columns")]
    EmptyTable(String),

    /// A native column type has no `BasicType` mapping
    #[error("Unsupported type '{native_type}' for column '{table}.{column}'")]
    UnsupportedType {
        table: String,
        column: String,
        native_type: String,
    },

    /// A type name in configuration is not a `BasicType`
    #[error("Unknown type name: {0}")]
    UnknownType(String),

    /// A column's type could be taken neither from configuration nor from the target
    #[error("Cannot resolve type of column '{table}.{column}': declare a type or create the table in the sink")]
    UnresolvedColumnType { table: String, column: String },

    /// Source and sink disagree on a table's shape
    #[error("Schema mismatch for table '{table}': {reason}")]
    Mismatch { table: String, reason: String },
}

// ============================================================================
// Fields and Record Types
// ============================================================================

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    /// Column name
    pub name: String,

    /// Column type
    #[serde(rename = "type")]
    pub field_type: BasicType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, field_type: BasicType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Ordered sequence of fields.
///
/// Field order is fixed at construction and defines the positional index
/// used by record builders and value generators.
#[derive(Debug, Clone)]
pub struct RecordType {
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl RecordType {
    /// Create a record type, rejecting duplicate field names.
    pub fn new(fields: Vec<Field>) -> Result<Self, SchemaError> {
        let mut index = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            if index.insert(field.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self { fields, index })
    }

    /// All fields in positional order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Field at a position.
    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Position of a field by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Field by name.
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.index_of(name).map(|i| &self.fields[i])
    }

    /// All field names in positional order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for RecordType {}

/// Incremental builder for [`RecordType`], used during discovery.
#[derive(Debug, Default)]
pub struct RecordTypeBuilder {
    fields: Vec<Field>,
}

impl RecordTypeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_field(&mut self, name: impl Into<String>, field_type: BasicType) -> &mut Self {
        self.fields.push(Field::new(name, field_type));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn build(self) -> Result<RecordType, SchemaError> {
        RecordType::new(self.fields)
    }
}

// ============================================================================
// Tables and Schemas
// ============================================================================

/// A named record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Table name
    pub name: String,

    /// Shared record type of every row in this table
    pub record_type: Arc<RecordType>,
}

impl Table {
    /// Create a new table.
    pub fn new(name: impl Into<String>, record_type: RecordType) -> Self {
        Self {
            name: name.into(),
            record_type: Arc::new(record_type),
        }
    }
}

/// Tables keyed by unique name, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    tables: Vec<Table>,
    table_map: HashMap<String, usize>,
}

impl Schema {
    /// Create a schema from a list of tables, rejecting duplicate names.
    pub fn new(tables: Vec<Table>) -> Result<Self, SchemaError> {
        let mut builder = SchemaBuilder::new();
        for table in tables {
            builder.add_table(table)?;
        }
        Ok(builder.build())
    }

    /// Get a table by name.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.table_map
            .get(name)
            .and_then(|&idx| self.tables.get(idx))
    }

    /// All tables in insertion order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Get all table names in the schema.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Check that every table of `self` exists in `target` with the same
    /// field names, order and types.
    pub fn reconcile_with(&self, target: &Schema) -> Result<(), SchemaError> {
        for table in &self.tables {
            let target_table =
                target
                    .get_table(&table.name)
                    .ok_or_else(|| SchemaError::Mismatch {
                        table: table.name.clone(),
                        reason: "table does not exist in the sink".to_string(),
                    })?;

            let ours = table.record_type.fields();
            let theirs = target_table.record_type.fields();
            if ours.len() != theirs.len() {
                return Err(SchemaError::Mismatch {
                    table: table.name.clone(),
                    reason: format!(
                        "source has {} columns, sink has {}",
                        ours.len(),
                        theirs.len()
                    ),
                });
            }

            for (position, (a, b)) in ours.iter().zip(theirs).enumerate() {
                if a != b {
                    return Err(SchemaError::Mismatch {
                        table: table.name.clone(),
                        reason: format!(
                            "column {position} is {}:{} in the source but {}:{} in the sink",
                            a.name, a.field_type, b.name, b.field_type
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Incremental builder for [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    tables: Vec<Table>,
    table_map: HashMap<String, usize>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, rejecting a duplicate name.
    pub fn add_table(&mut self, table: Table) -> Result<&mut Self, SchemaError> {
        if self.table_map.contains_key(&table.name) {
            return Err(SchemaError::DuplicateTable(table.name));
        }
        self.table_map.insert(table.name.clone(), self.tables.len());
        self.tables.push(table);
        Ok(self)
    }

    /// Freeze the accumulated tables.
    pub fn build(self) -> Schema {
        Schema {
            tables: self.tables,
            table_map: self.table_map,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
