//! MySQL sink for shardsync.
//!
//! Discovers the tables of the connected database through
//! `INFORMATION_SCHEMA.COLUMNS`, maps their column types to
//! [`BasicType`](sync_core::BasicType)s and inserts batches with
//! conflict-skipping `INSERT IGNORE` statements, so that rows re-delivered
//! after a resume never fail on duplicate keys.

mod config;
mod schema;
mod sink;
pub mod testing;
mod types;
mod writer;

pub use config::MySQLSinkConfig;
pub use schema::{
    build_schema, create_table_ddl, discover_columns, insert_template, ColumnMetadata,
};
pub use sink::MySQLSink;
pub use types::{basic_type_to_mysql_ddl, mysql_type_to_basic_type, to_mysql_value};
pub use writer::MySQLSinkWriter;

/// Connector type identifier of the MySQL sink.
pub const CONNECTOR_TYPE: &str = "mysql";
