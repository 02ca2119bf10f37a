//! The closed set of column types shared by all connectors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::schema::SchemaError;

/// Column type understood by every connector.
///
/// Connectors map their native type codes onto this enumeration when
/// discovering a schema, and back again when materializing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasicType {
    Boolean,
    Int,
    Long,
    Float,
    Double,
    String,
    Binary,
}

impl BasicType {
    /// Every variant, in declaration order.
    pub const ALL: [BasicType; 7] = [
        BasicType::Boolean,
        BasicType::Int,
        BasicType::Long,
        BasicType::Float,
        BasicType::Double,
        BasicType::String,
        BasicType::Binary,
    ];

    /// Lowercase name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            BasicType::Boolean => "boolean",
            BasicType::Int => "int",
            BasicType::Long => "long",
            BasicType::Float => "float",
            BasicType::Double => "double",
            BasicType::String => "string",
            BasicType::Binary => "binary",
        }
    }

    /// Whether values of this type are numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            BasicType::Int | BasicType::Long | BasicType::Float | BasicType::Double
        )
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BasicType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BasicType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SchemaError::UnknownType(s.to_string()))
    }
}
