//! Consumer configuration.

use serde::{Deserialize, Serialize};
use shared_bus::ProcessedIdCache;

/// Default number of entries drained per batch.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Configuration for the batch consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerConfig {
    /// Entries drained by `process_next_batch`.
    pub batch_size: usize,
    /// Skip events whose `request_id` was already processed.
    pub enable_dedup: bool,
    /// How long a processed `request_id` is remembered.
    pub dedup_window_ms: u64,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            enable_dedup: true,
            dedup_window_ms: ProcessedIdCache::DEFAULT_WINDOW_MS,
        }
    }
}
