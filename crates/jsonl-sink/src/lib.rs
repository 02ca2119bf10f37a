//! JSON Lines file sink for shardsync.
//!
//! Every writer appends to its own `<dir>/<table>-<uuid>.jsonl` file, one
//! JSON object per record keyed by column name. Binary values are written
//! as standard base64 strings.
//!
//! The writer checkpoint is the file path plus the byte offset after the
//! last fully written batch. Reopening a writer from a checkpoint truncates
//! the file back to that offset, so a batch that was only partly written
//! before a crash is discarded rather than duplicated.

mod checkpoint;
mod config;
mod encode;
mod sink;
mod writer;

pub use crate::checkpoint::JsonlSinkCheckpoint;
pub use config::JsonlSinkConfig;
pub use encode::record_to_json;
pub use sink::JsonlSink;
pub use writer::JsonlSinkWriter;

/// Connector type identifier of the JSONL sink.
pub const CONNECTOR_TYPE: &str = "jsonl";
