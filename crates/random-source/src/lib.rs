//! Synthetic row source for shardsync.
//!
//! Rows are manufactured on demand rather than read from storage. Each column
//! is filled by a [`FieldGenerator`]: either a compiled per-column
//! [`rule`](crate::rule) or the default generator of the column's type.
//!
//! # Example Configuration
//!
//! ```yaml
//! type: random
//! seed: 42
//! tables:
//!   users:
//!     rows: 1000000
//!     columns:
//!       - name: id
//!         type: long
//!         rule: "seq()"
//!       - name: email
//!         type: string
//!         rule: "concat('user', seq(), '@example.com')"
//!       - name: active
//!         type: boolean
//!         rule: "bool(0.9)"
//!       - name: avatar
//!         type: binary
//! ```
//!
//! # Randomness
//!
//! Without a `seed`, each reader opens a fresh OS-seeded stream, so a resumed
//! shard produces different values than an uninterrupted run would have.
//! With a `seed`, every row uses a stream derived from the seed, the table
//! name and the row number, so output is identical across resumes and shard
//! layouts.

mod checkpoint;
mod config;
pub mod generators;
mod reader;
pub mod rule;
mod source;

pub use crate::checkpoint::RandomSourceCheckpoint;
pub use config::{ColumnRule, RandomSourceConfig, RandomTableConfig};
pub use generators::{default_generator, FieldGenerator};
pub use reader::RandomSourceReader;
pub use rule::{compile_rule, Rule, RuleError};
pub use source::RandomSource;

/// Connector type identifier of the random source.
pub const CONNECTOR_TYPE: &str = "random";
