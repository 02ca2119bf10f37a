use std::path::Path;

use serde_json::Value as JsonValue;
use shardsync::{ConnectorRegistry, JobConfig, Pipeline};

pub fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};
    let _ = tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .try_init();
}

/// A random → JSONL job generating `rows` orders.
pub fn orders_job(
    name: &str,
    out: &Path,
    checkpoints: &Path,
    rows: u64,
    parallelism: usize,
    batch_size: usize,
) -> JobConfig {
    let yaml = format!(
        r#"
name: {name}
batch_size: {batch_size}
parallelism: {parallelism}
checkpoint_interval: 1
checkpoints:
  storage: filesystem
  dir: '{checkpoints}'
source:
  type: random
  seed: 7
  tables:
    orders:
      rows: {rows}
      columns:
        - name: id
          rule: "seq()"
        - name: name
          rule: "concat('customer-', seq())"
sink:
  type: jsonl
  dir: '{out}'
  tables:
    orders:
      - {{ name: id, type: long }}
      - {{ name: name, type: string }}
      - {{ name: payload, type: binary }}
"#,
        checkpoints = checkpoints.display(),
        out = out.display(),
    );
    JobConfig::from_yaml(&yaml).unwrap()
}

pub fn pipeline(job: JobConfig) -> Pipeline {
    Pipeline::new(job, ConnectorRegistry::with_builtin())
}

/// Every line of every file in `dir`.
pub fn read_rows(dir: &Path) -> Vec<JsonValue> {
    let mut rows = Vec::new();
    for entry in std::fs::read_dir(dir).unwrap() {
        let content = std::fs::read_to_string(entry.unwrap().path()).unwrap();
        rows.extend(
            content
                .lines()
                .map(|line| serde_json::from_str::<JsonValue>(line).unwrap()),
        );
    }
    rows
}

/// Sorted `id` column of every row in `dir`.
pub fn read_ids(dir: &Path) -> Vec<i64> {
    let mut ids: Vec<i64> = read_rows(dir)
        .iter()
        .map(|row| row["id"].as_i64().unwrap())
        .collect();
    ids.sort_unstable();
    ids
}

pub fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
