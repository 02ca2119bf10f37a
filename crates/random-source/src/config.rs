//! Configuration of the random source.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use sync_core::BasicType;

/// Random source options, as found under `source:` in a job file.
///
/// ```yaml
/// type: random
/// seed: 42
/// tables:
///   orders:
///     rows: 100000
///     shards: 8
///     columns:
///       - name: id
///         type: long
///         rule: "seq()"
///       - name: note
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RandomSourceConfig {
    /// Seed for reproducible output across runs and resumes.
    ///
    /// When absent, every reader draws fresh entropy from the OS on open.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Tables to generate, keyed by name
    #[serde(default)]
    pub tables: BTreeMap<String, RandomTableConfig>,
}

/// One generated table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RandomTableConfig {
    /// Number of rows to generate
    pub rows: u64,

    /// Number of shards; defaults to the job's parallelism
    #[serde(default)]
    pub shards: Option<usize>,

    /// Columns in order, with optional type and rule
    #[serde(default)]
    pub columns: Vec<ColumnRule>,
}

/// Per-column generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnRule {
    pub name: String,

    /// Column type; required unless the sink already has this table
    #[serde(default, rename = "type")]
    pub column_type: Option<BasicType>,

    /// Generation rule; the type default is used when absent
    #[serde(default)]
    pub rule: Option<String>,
}

impl ColumnRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: None,
            rule: None,
        }
    }

    pub fn with_type(mut self, column_type: BasicType) -> Self {
        self.column_type = Some(column_type);
        self
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }
}
