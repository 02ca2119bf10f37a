//! Opaque, self-describing wrapper around connector checkpoints.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Checkpoint;

/// Connector-agnostic checkpoint payload.
///
/// The orchestrator persists envelopes verbatim and never looks inside
/// `state`; only the connector that produced an envelope can parse it.
///
/// # Format
///
/// ```json
/// {
///     "connector_type": "random",
///     "state": { "next_row": 5000 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointEnvelope {
    /// Connector type identifier
    pub connector_type: String,
    /// Serialized checkpoint data as JSON Value
    pub state: serde_json::Value,
}

impl CheckpointEnvelope {
    /// Wrap a connector-specific checkpoint.
    pub fn new<C: Checkpoint>(checkpoint: &C) -> anyhow::Result<Self> {
        Ok(Self {
            connector_type: C::CONNECTOR_TYPE.to_string(),
            state: serde_json::to_value(checkpoint)?,
        })
    }

    /// Parse the envelope into a connector-specific type.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The `connector_type` doesn't match `C::CONNECTOR_TYPE`
    /// - The state can't be deserialized into type `C`
    pub fn parse<C: Checkpoint>(&self) -> anyhow::Result<C> {
        if self.connector_type != C::CONNECTOR_TYPE {
            anyhow::bail!(
                "Checkpoint type mismatch: expected '{}', found '{}'",
                C::CONNECTOR_TYPE,
                self.connector_type
            );
        }
        Ok(serde_json::from_value(self.state.clone())?)
    }

    /// Get the connector type of this envelope.
    pub fn connector_type(&self) -> &str {
        &self.connector_type
    }
}

impl fmt::Display for CheckpointEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.connector_type, self.state)
    }
}
