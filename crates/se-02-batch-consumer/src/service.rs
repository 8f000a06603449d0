//! # Batch Consumer Service
//!
//! Implements [`BatchConsumerApi`] with partial-failure redelivery: each
//! drained entry succeeds or fails on its own, and only the failures go
//! back to the queue.
//!
//! ```text
//! drain(N) ──→ [e1 e2 e3 e4 e5]
//!                │  │  │  │  │
//!             handle each independently
//!                ✓  ✓  ✗  ✓  ✓
//!                      │
//!          requeue([e3]) at the queue front
//! ```
//!
//! Only retryable failures are requeued; permanent ones (an invalid event)
//! are discarded. Processed request ids are remembered per queue, so one
//! service can poll several queues that received the same fanned-out event.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::{EventQueue, ProcessedIdCache, QueueError, QueuedMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{BatchResult, ConsumerConfig, ConsumerError, ItemFailure};
use crate::ports::inbound::BatchConsumerApi;
use crate::ports::outbound::{MessageHandler, TimeSource};

/// Batch Consumer Service.
pub struct BatchConsumerService<H, C>
where
    H: MessageHandler,
    C: TimeSource,
{
    config: ConsumerConfig,
    handler: Arc<H>,
    clock: Arc<C>,
    /// Queue name -> processed ids seen on that queue.
    processed: Mutex<HashMap<String, ProcessedIdCache>>,
}

impl<H, C> BatchConsumerService<H, C>
where
    H: MessageHandler,
    C: TimeSource,
{
    pub fn new(config: ConsumerConfig, handler: Arc<H>, clock: Arc<C>) -> Self {
        Self {
            config,
            handler,
            clock,
            processed: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    fn is_duplicate(&self, queue: &str, message: &QueuedMessage) -> bool {
        self.config.enable_dedup
            && self.processed.lock().get(queue).is_some_and(|cache| {
                cache.contains(&message.event.request_id(), self.clock.now())
            })
    }

    fn mark_processed(&self, queue: &str, message: &QueuedMessage) {
        if !self.config.enable_dedup {
            return;
        }
        let now = self.clock.now();
        let window_ms = self.config.dedup_window_ms;
        self.processed
            .lock()
            .entry(queue.to_string())
            .or_insert_with(|| {
                ProcessedIdCache::with_config(window_ms, ProcessedIdCache::DEFAULT_GC_INTERVAL_MS)
            })
            .record(message.event.request_id(), now);
    }
}

fn unavailable(err: QueueError) -> ConsumerError {
    match err {
        QueueError::Closed { queue } => ConsumerError::QueueUnavailable {
            queue,
            reason: "closed".to_string(),
        },
        QueueError::Full { queue, capacity } => ConsumerError::QueueUnavailable {
            queue,
            reason: format!("full (capacity {capacity})"),
        },
    }
}

#[async_trait]
impl<H, C> BatchConsumerApi for BatchConsumerService<H, C>
where
    H: MessageHandler,
    C: TimeSource,
{
    async fn process_batch(
        &self,
        queue: &EventQueue,
        batch_size: usize,
    ) -> Result<BatchResult, ConsumerError> {
        let mut result = BatchResult::default();
        if batch_size == 0 {
            return Ok(result);
        }

        let batch = queue.drain(batch_size).map_err(unavailable)?;
        if batch.is_empty() {
            return Ok(result);
        }

        let mut retry = Vec::new();

        for message in batch {
            if self.is_duplicate(queue.name(), &message) {
                debug!(
                    queue = queue.name(),
                    request_id = %message.event.request_id(),
                    "Skipping already processed event"
                );
                result.duplicates += 1;
                continue;
            }
            if message.receive_count > 1 {
                debug!(
                    queue = queue.name(),
                    message_id = %message.message_id,
                    receive_count = message.receive_count,
                    "Redelivered entry"
                );
            }

            match self.handler.handle(&message).await {
                Ok(()) => {
                    self.mark_processed(queue.name(), &message);
                    result.processed += 1;
                }
                Err(e) => {
                    let retryable = e.is_retryable();
                    if retryable {
                        warn!(
                            queue = queue.name(),
                            request_id = %message.event.request_id(),
                            receive_count = message.receive_count,
                            error = %e,
                            "Entry failed, returning for redelivery"
                        );
                    } else {
                        warn!(
                            queue = queue.name(),
                            request_id = %message.event.request_id(),
                            receive_count = message.receive_count,
                            error = %e,
                            "Entry failed permanently, discarding"
                        );
                        result.discarded += 1;
                    }
                    result.failed += 1;
                    result.failures.push(ItemFailure {
                        message_id: message.message_id,
                        request_id: message.event.request_id(),
                        receive_count: message.receive_count,
                        error: e,
                    });
                    if retryable {
                        retry.push(message);
                    }
                }
            }
        }

        if !retry.is_empty() {
            let count = retry.len();
            queue.requeue(retry).map_err(unavailable)?;
            result.requeued = count;
        }

        info!(
            queue = queue.name(),
            processed = result.processed,
            failed = result.failed,
            requeued = result.requeued,
            discarded = result.discarded,
            duplicates = result.duplicates,
            "Batch complete"
        );

        Ok(result)
    }

    async fn process_next_batch(&self, queue: &EventQueue) -> Result<BatchResult, ConsumerError> {
        self.process_batch(queue, self.config.batch_size).await
    }
}
