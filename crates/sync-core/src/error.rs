//! Error taxonomy surfaced by connectors.

use crate::record::RecordShapeError;
use crate::schema::SchemaError;

/// Boxed error used to carry driver and I/O failures across the trait boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by sources, sinks, readers and writers.
///
/// Initialization errors (`Schema`, `RuleCompile`, `Config`) are fatal to the
/// table or shard and are raised before any data moves. Batch errors
/// (`Read`, `Write`) are surfaced to the caller unchanged; retrying is left to
/// the orchestrator via checkpoint and resume.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// Schema discovery or reconciliation failed
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Resources could not be acquired or a checkpoint is invalid
    #[error("Failed to open {connector}: {message}")]
    Open { connector: String, message: String },

    /// The connector was used before `init()` completed
    #[error("Connector {0} is not initialized")]
    NotInitialized(String),

    /// A generation rule is malformed or does not fit its column
    #[error("Invalid rule for column '{table}.{column}': {message}")]
    RuleCompile {
        table: String,
        column: String,
        message: String,
    },

    /// Reading a batch failed
    #[error("Failed to read from {connector}: {source}")]
    Read {
        connector: String,
        #[source]
        source: BoxError,
    },

    /// Writing a batch failed; none of the batch is considered durable
    #[error("Failed to write to {connector} table '{table}': {source}")]
    Write {
        connector: String,
        table: String,
        #[source]
        source: BoxError,
    },

    /// A record did not match its record type
    #[error(transparent)]
    RecordShape(#[from] RecordShapeError),

    /// Connector options are invalid
    #[error("Invalid {connector} configuration: {message}")]
    Config { connector: String, message: String },
}

impl ConnectorError {
    pub fn open(connector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Open {
            connector: connector.into(),
            message: message.into(),
        }
    }

    pub fn read(connector: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Read {
            connector: connector.into(),
            source: source.into(),
        }
    }

    pub fn write(
        connector: impl Into<String>,
        table: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Write {
            connector: connector.into(),
            table: table.into(),
            source: source.into(),
        }
    }

    pub fn config(connector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            connector: connector.into(),
            message: message.into(),
        }
    }

    /// Whether this error was raised before any data could move.
    pub fn is_init_error(&self) -> bool {
        matches!(
            self,
            Self::Schema(_)
                | Self::RuleCompile { .. }
                | Self::Config { .. }
                | Self::NotInitialized(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_write_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = ConnectorError::write("jsonl", "orders", io);

        assert_eq!(
            err.to_string(),
            "Failed to write to jsonl table 'orders': pipe closed"
        );
        assert!(err.source().is_some());
        assert!(!err.is_init_error());
    }

    #[test]
    fn test_schema_error_is_transparent() {
        let err: ConnectorError = SchemaError::TableNotFound("users".to_string()).into();
        assert_eq!(err.to_string(), "Table not found: users");
        assert!(err.is_init_error());
    }
}
