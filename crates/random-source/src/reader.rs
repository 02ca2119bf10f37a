//! Reader producing one shard of synthetic rows.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use checkpoint::CheckpointEnvelope;
use connector::{SourceCheckpoint, SourceReader};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sync_core::{ConnectorError, RecordBatch, RecordBatchBuilder, RecordBuilder, ShardRange, Table};
use tracing::debug;

use crate::checkpoint::RandomSourceCheckpoint;
use crate::generators::{default_generator, FieldGenerator};
use crate::rule::compile_rule;
use crate::CONNECTOR_TYPE;

/// Golden-ratio increment used to spread row numbers across the seed space.
const ROW_SEED_MULTIPLIER: u64 = 0x9E37_79B9_7F4A_7C15;

/// Source of randomness for one open reader.
enum RandomStream {
    /// One OS-seeded stream for the whole shard
    Entropy(StdRng),
    /// A fresh stream per row, derived from a base seed and the row number
    Seeded { base: u64 },
}

/// State that only exists between `open` and `close`.
struct OpenState {
    builder: RecordBatchBuilder,
    generators: Vec<FieldGenerator>,
    stream: RandomStream,
}

/// Produces rows `[range.start, range.end)` of one table.
///
/// `current` is the zero-based cursor of the next row; the generators see
/// the 1-based row number `current + 1`.
pub struct RandomSourceReader {
    table: Table,
    range: ShardRange,
    current: u64,
    batch_size: usize,
    rules: Arc<HashMap<String, String>>,
    seed: Option<u64>,
    state: Option<OpenState>,
}

impl RandomSourceReader {
    pub fn new(
        table: Table,
        range: ShardRange,
        batch_size: usize,
        rules: Arc<HashMap<String, String>>,
        seed: Option<u64>,
    ) -> Self {
        Self {
            table,
            range,
            current: range.start,
            batch_size,
            rules,
            seed,
            state: None,
        }
    }

    /// Zero-based cursor of the next row to produce.
    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn range(&self) -> ShardRange {
        self.range
    }

    fn compile_generators(&self) -> Result<Vec<FieldGenerator>, ConnectorError> {
        self.table
            .record_type
            .fields()
            .iter()
            .map(|field| match self.rules.get(&field.name) {
                Some(source) => compile_rule(source, field.field_type)
                    .map(FieldGenerator::Rule)
                    .map_err(|e| ConnectorError::RuleCompile {
                        table: self.table.name.clone(),
                        column: field.name.clone(),
                        message: e.to_string(),
                    }),
                None => Ok(default_generator(field.field_type)),
            })
            .collect()
    }

    fn restore(&self, checkpoint: &SourceCheckpoint) -> Result<u64, ConnectorError> {
        let restored: RandomSourceCheckpoint = checkpoint.parse().map_err(|e| {
            ConnectorError::open(CONNECTOR_TYPE, format!("invalid checkpoint: {e}"))
        })?;
        if !self.range.contains_cursor(restored.next_row) {
            return Err(ConnectorError::open(
                CONNECTOR_TYPE,
                format!(
                    "checkpoint cursor {} is outside shard {} of table '{}'",
                    restored.next_row, self.range, self.table.name
                ),
            ));
        }
        Ok(restored.next_row)
    }
}

/// 64-bit FNV-1a, used to give every table its own seed space.
fn fnv1a(text: &str) -> u64 {
    text.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

fn row_seed(base: u64, row_number: u64) -> u64 {
    base.wrapping_add(row_number.wrapping_mul(ROW_SEED_MULTIPLIER))
}

#[async_trait]
impl SourceReader for RandomSourceReader {
    async fn open(&mut self, checkpoint: Option<&SourceCheckpoint>) -> Result<(), ConnectorError> {
        if self.state.is_some() {
            return Err(ConnectorError::open(CONNECTOR_TYPE, "reader is already open"));
        }

        // A bad rule fails here, before any row is produced
        let generators = self.compile_generators()?;
        let current = match checkpoint {
            Some(checkpoint) => self.restore(checkpoint)?,
            None => self.range.start,
        };
        let stream = match self.seed {
            Some(seed) => RandomStream::Seeded {
                base: seed ^ fnv1a(&self.table.name),
            },
            None => RandomStream::Entropy(StdRng::from_os_rng()),
        };

        self.current = current;
        self.state = Some(OpenState {
            builder: RecordBatchBuilder::new(self.table.record_type.clone(), self.batch_size),
            generators,
            stream,
        });
        debug!(
            "Opened random reader for '{}' shard {} at row {}",
            self.table.name, self.range, self.current
        );
        Ok(())
    }

    async fn read_batch(&mut self) -> Result<Option<RecordBatch>, ConnectorError> {
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| ConnectorError::open(CONNECTOR_TYPE, "reader is not open"))?;

        while self.current < self.range.end && !state.builder.is_full() {
            let row_number = self.current + 1;
            let mut row_rng;
            let rng = match &mut state.stream {
                RandomStream::Entropy(rng) => rng,
                RandomStream::Seeded { base } => {
                    row_rng = StdRng::seed_from_u64(row_seed(*base, row_number));
                    &mut row_rng
                }
            };

            let mut record = RecordBuilder::new(self.table.record_type.clone());
            for (index, generator) in state.generators.iter().enumerate() {
                record.set(index, generator.generate(row_number, rng))?;
            }
            state.builder.add_row(record.build()?);
            self.current += 1;
        }

        if state.builder.is_empty() {
            Ok(None)
        } else {
            Ok(Some(state.builder.build_and_reset()))
        }
    }

    fn checkpoint(&self) -> Result<Option<SourceCheckpoint>, ConnectorError> {
        let checkpoint = RandomSourceCheckpoint {
            next_row: self.current,
        };
        CheckpointEnvelope::new(&checkpoint)
            .map(Some)
            .map_err(|e| ConnectorError::read(CONNECTOR_TYPE, e))
    }

    async fn close(&mut self) -> Result<(), ConnectorError> {
        self.state = None;
        Ok(())
    }
}
