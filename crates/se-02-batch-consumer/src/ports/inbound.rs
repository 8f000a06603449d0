//! # Inbound Port - BatchConsumerApi

use async_trait::async_trait;
use shared_bus::EventQueue;

use crate::domain::{BatchResult, ConsumerError};

/// Primary API for the Batch Consumer subsystem.
#[async_trait]
pub trait BatchConsumerApi: Send + Sync {
    /// Drain up to `batch_size` entries from `queue` and hand each to the
    /// handler independently.
    ///
    /// Failed entries go back to the front of the queue, as one block in
    /// their original relative order. A `batch_size` of zero drains nothing.
    ///
    /// # Errors
    /// - `QueueUnavailable`: the queue is closed
    async fn process_batch(
        &self,
        queue: &EventQueue,
        batch_size: usize,
    ) -> Result<BatchResult, ConsumerError>;

    /// [`process_batch`](Self::process_batch) with the configured batch size.
    async fn process_next_batch(&self, queue: &EventQueue) -> Result<BatchResult, ConsumerError>;
}
