//! Outcome of one batch.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::ProcessingError;

/// One entry the handler failed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub message_id: Uuid,
    pub request_id: Uuid,
    /// Deliveries so far, including the failed one.
    pub receive_count: u32,
    pub error: ProcessingError,
}

/// Counters for one `process_batch` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Entries the handler accepted.
    pub processed: usize,
    /// Entries the handler failed on.
    pub failed: usize,
    /// Entries returned to the queue.
    pub requeued: usize,
    /// Failed entries dropped because a retry could never succeed.
    pub discarded: usize,
    /// Entries skipped because their `request_id` was already processed.
    pub duplicates: usize,
    #[serde(skip)]
    pub failures: Vec<ItemFailure>,
}

impl BatchResult {
    /// Entries taken off the queue by this batch.
    #[must_use]
    pub fn drained(&self) -> usize {
        self.processed + self.failed + self.duplicates
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drained() == 0
    }

    /// Fold another batch into this one.
    pub fn merge(&mut self, other: BatchResult) {
        self.processed += other.processed;
        self.failed += other.failed;
        self.requeued += other.requeued;
        self.discarded += other.discarded;
        self.duplicates += other.duplicates;
        self.failures.extend(other.failures);
    }
}
