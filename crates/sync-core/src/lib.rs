//! Core types for the shardsync framework.
//!
//! This crate provides the foundational types shared by every connector:
//!
//! - [`BasicType`] - The closed set of column types understood by all connectors
//! - [`Schema`], [`Table`], [`RecordType`], [`Field`] - Immutable table descriptors
//! - [`Value`] - A single column value
//! - [`Record`], [`RecordBatch`] and their builders - Rows flowing from reader to writer
//! - [`ShardRange`] - A disjoint row range of one table
//! - [`ConnectorError`] - The error taxonomy surfaced by connectors
//!
//! # Architecture
//!
//! ```text
//! sync-core (this crate)
//!    │
//!    ├─── checkpoint        (checkpoint envelopes and stores)
//!    ├─── connector         (Source / Sink / Reader / Writer traits)
//!    │
//!    ├─── random-source     (synthetic rows from per-column rules)
//!    ├─── mysql-sink        (INSERT IGNORE into discovered tables)
//!    └─── jsonl-sink        (append-only JSON lines files)
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use sync_core::{BasicType, Field, RecordBatchBuilder, RecordBuilder, RecordType, Value};
//!
//! let record_type = Arc::new(
//!     RecordType::new(vec![
//!         Field::new("id", BasicType::Long),
//!         Field::new("name", BasicType::String),
//!     ])
//!     .unwrap(),
//! );
//!
//! let mut batch = RecordBatchBuilder::new(record_type.clone(), 2);
//! let mut row = RecordBuilder::new(record_type);
//! row.set(0, Value::Long(1)).unwrap();
//! row.set(1, Value::String("alice".into())).unwrap();
//! batch.add_row(row.build().unwrap());
//!
//! let batch = batch.build_and_reset();
//! assert_eq!(batch.len(), 1);
//! ```

pub mod error;
pub mod record;
pub mod schema;
pub mod shard;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use error::{BoxError, ConnectorError};
pub use record::{Record, RecordBatch, RecordBatchBuilder, RecordBuilder, RecordShapeError};
pub use schema::{Field, RecordType, RecordTypeBuilder, Schema, SchemaBuilder, SchemaError, Table};
pub use shard::ShardRange;
pub use types::BasicType;
pub use values::Value;
