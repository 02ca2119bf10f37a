//! Pipeline end-to-end tests
//!
//! Jobs run from the random source into the JSONL sink (or a test sink that
//! fails on demand) with filesystem checkpoints in a temporary directory.

mod failures;
mod flaky_sink;
mod helpers;
mod random_to_jsonl;
mod resume;
