//! JSONL sink options.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use sync_core::Field;

/// Options of the JSONL sink.
///
/// The sink has no metadata to discover, so every table is declared:
///
/// ```yaml
/// type: jsonl
/// dir: ./out
/// tables:
///   orders:
///     - { name: id, type: long }
///     - { name: name, type: string }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonlSinkConfig {
    /// Directory receiving the output files
    pub dir: PathBuf,

    /// Columns of each table, in order
    #[serde(default)]
    pub tables: BTreeMap<String, Vec<Field>>,
}

impl JsonlSinkConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            tables: BTreeMap::new(),
        }
    }

    pub fn with_table(mut self, name: impl Into<String>, fields: Vec<Field>) -> Self {
        self.tables.insert(name.into(), fields);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_core::BasicType;

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
dir: /tmp/out
tables:
  orders:
    - { name: id, type: long }
    - { name: note, type: string }
"#;
        let config: JsonlSinkConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config,
            JsonlSinkConfig::new("/tmp/out").with_table(
                "orders",
                vec![
                    Field::new("id", BasicType::Long),
                    Field::new("note", BasicType::String)
                ]
            )
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        let yaml = "dir: x\ntables:\n  t:\n    - { name: a, type: decimal }\n";
        assert!(serde_yaml::from_str::<JsonlSinkConfig>(yaml).is_err());
    }
}
