//! Rows and batches of rows flowing from readers to writers.

use crate::schema::RecordType;
use crate::types::BasicType;
use crate::values::Value;
use std::sync::Arc;

/// Error raised when a record does not match its record type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordShapeError {
    /// A field was never set before `build()`
    #[error("Field '{0}' was not set")]
    MissingField(String),

    /// A position outside the record type was addressed
    #[error("Field index {index} out of range for a record of {field_count} fields")]
    IndexOutOfRange { index: usize, field_count: usize },

    /// A field name not present in the record type was addressed
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    /// A value does not conform to its field's type
    #[error("Field '{field}' expects {expected} but got {actual}")]
    TypeMismatch {
        field: String,
        expected: BasicType,
        actual: BasicType,
    },
}

/// One row: values positionally aligned with a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    /// Value at a position.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// All values in positional order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Accumulates the values of one record positionally.
#[derive(Debug)]
pub struct RecordBuilder {
    record_type: Arc<RecordType>,
    values: Vec<Option<Value>>,
}

impl RecordBuilder {
    pub fn new(record_type: Arc<RecordType>) -> Self {
        let values = vec![None; record_type.field_count()];
        Self {
            record_type,
            values,
        }
    }

    /// Set the value at `index`, checking it against the field's type.
    pub fn set(&mut self, index: usize, value: Value) -> Result<&mut Self, RecordShapeError> {
        let field =
            self.record_type
                .field(index)
                .ok_or_else(|| RecordShapeError::IndexOutOfRange {
                    index,
                    field_count: self.record_type.field_count(),
                })?;

        if let Some(actual) = value.basic_type() {
            if actual != field.field_type {
                return Err(RecordShapeError::TypeMismatch {
                    field: field.name.clone(),
                    expected: field.field_type,
                    actual,
                });
            }
        }

        self.values[index] = Some(value);
        Ok(self)
    }

    /// Set the value of the field called `name`.
    pub fn set_by_name(&mut self, name: &str, value: Value) -> Result<&mut Self, RecordShapeError> {
        let index = self
            .record_type
            .index_of(name)
            .ok_or_else(|| RecordShapeError::UnknownField(name.to_string()))?;
        self.set(index, value)
    }

    /// Freeze into a record; every field must have been set.
    pub fn build(self) -> Result<Record, RecordShapeError> {
        let mut values = Vec::with_capacity(self.values.len());
        for (i, value) in self.values.into_iter().enumerate() {
            match value {
                Some(v) => values.push(v),
                None => {
                    let name = self
                        .record_type
                        .field(i)
                        .map(|f| f.name.clone())
                        .unwrap_or_default();
                    return Err(RecordShapeError::MissingField(name));
                }
            }
        }
        Ok(Record { values })
    }
}

/// Ordered, bounded group of records sharing one record type.
#[derive(Debug, Clone)]
pub struct RecordBatch {
    record_type: Arc<RecordType>,
    records: Vec<Record>,
}

impl RecordBatch {
    /// Create a batch directly from records.
    pub fn new(record_type: Arc<RecordType>, records: Vec<Record>) -> Self {
        Self {
            record_type,
            records,
        }
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl<'a> IntoIterator for &'a RecordBatch {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Accumulates records up to a configured batch size.
///
/// Being full is advisory: the builder never rejects a row, callers check
/// [`is_full`](Self::is_full) and decide when to flush. One builder is
/// reused across batches through [`build_and_reset`](Self::build_and_reset).
#[derive(Debug)]
pub struct RecordBatchBuilder {
    record_type: Arc<RecordType>,
    max_size: usize,
    rows: Vec<Record>,
}

impl RecordBatchBuilder {
    pub fn new(record_type: Arc<RecordType>, max_size: usize) -> Self {
        Self {
            record_type,
            max_size,
            rows: Vec::with_capacity(max_size),
        }
    }

    pub fn add_row(&mut self, record: Record) {
        debug_assert_eq!(record.len(), self.record_type.field_count());
        self.rows.push(record);
    }

    /// Number of rows accumulated since the last reset.
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn is_full(&self) -> bool {
        self.rows.len() >= self.max_size
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Freeze accumulated rows into a batch and clear the builder for reuse.
    pub fn build_and_reset(&mut self) -> RecordBatch {
        let rows = std::mem::replace(&mut self.rows, Vec::with_capacity(self.max_size));
        RecordBatch::new(self.record_type.clone(), rows)
    }
}
