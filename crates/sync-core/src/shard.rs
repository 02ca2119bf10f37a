//! Row ranges assigned to individual readers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open row cursor range `[start, end)` of one table.
///
/// Ranges produced by [`ShardRange::split`] never overlap and together cover
/// every row of the table exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShardRange {
    pub start: u64,
    pub end: u64,
}

impl ShardRange {
    /// Create a range; `end` is clamped so that it is never below `start`.
    pub fn new(start: u64, end: u64) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Number of rows in the range.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `cursor` is a valid resume position inside this range.
    ///
    /// `end` itself is valid: it denotes an exhausted shard.
    pub fn contains_cursor(&self, cursor: u64) -> bool {
        (self.start..=self.end).contains(&cursor)
    }

    /// Split `[0, total_rows)` into at most `shards` contiguous ranges.
    ///
    /// Remainder rows go to the leading shards, so sizes differ by at most
    /// one. Returns no ranges for an empty table.
    pub fn split(total_rows: u64, shards: usize) -> Vec<ShardRange> {
        if total_rows == 0 {
            return Vec::new();
        }
        let shards = (shards.max(1) as u64).min(total_rows);
        let base = total_rows / shards;
        let remainder = total_rows % shards;

        let mut ranges = Vec::with_capacity(shards as usize);
        let mut start = 0;
        for i in 0..shards {
            let len = base + u64::from(i < remainder);
            ranges.push(ShardRange::new(start, start + len));
            start += len;
        }
        ranges
    }
}

impl fmt::Display for ShardRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
