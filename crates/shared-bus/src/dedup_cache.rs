//! # Processed-Id Cache
//!
//! Delivery is at-least-once, so the same `request_id` can reach a consumer
//! more than once (producer republish, redelivery after a partial ack).
//! Consumers record successfully processed ids here and skip repeats.
//!
//! - Ids are remembered for a bounded window, then garbage-collected
//! - Only successes are recorded; a failed id must stay eligible for retry

use shared_types::Timestamp;
use std::collections::HashMap;
use uuid::Uuid;

/// Time-bounded set of processed request ids.
#[derive(Debug)]
pub struct ProcessedIdCache {
    /// Map of request id -> time it was recorded.
    cache: HashMap<Uuid, Timestamp>,

    /// How long an id is remembered, in milliseconds.
    window_ms: u64,

    /// Last garbage collection time.
    last_gc: Timestamp,

    /// Garbage collection interval in milliseconds.
    gc_interval_ms: u64,
}

impl ProcessedIdCache {
    /// Default window: 10 minutes.
    pub const DEFAULT_WINDOW_MS: u64 = 10 * 60 * 1000;

    /// Default garbage collection interval.
    pub const DEFAULT_GC_INTERVAL_MS: u64 = 10_000;

    /// Create a cache with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Self::DEFAULT_WINDOW_MS, Self::DEFAULT_GC_INTERVAL_MS)
    }

    /// Create a cache with custom settings.
    #[must_use]
    pub fn with_config(window_ms: u64, gc_interval_ms: u64) -> Self {
        Self {
            cache: HashMap::new(),
            window_ms,
            last_gc: 0,
            gc_interval_ms,
        }
    }

    /// Whether `id` was recorded within the window ending at `now`.
    #[must_use]
    pub fn contains(&self, id: &Uuid, now: Timestamp) -> bool {
        self.cache
            .get(id)
            .is_some_and(|&seen| now.saturating_sub(seen) < self.window_ms)
    }

    /// Record `id` as processed at `now`.
    pub fn record(&mut self, id: Uuid, now: Timestamp) {
        if now.saturating_sub(self.last_gc) > self.gc_interval_ms {
            self.garbage_collect(now);
            self.last_gc = now;
        }
        self.cache.insert(id, now);
    }

    /// Get the number of cached ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Remove ids older than the window.
    fn garbage_collect(&mut self, now: Timestamp) {
        let window = self.window_ms;
        self.cache
            .retain(|_, &mut seen| now.saturating_sub(seen) < window);
    }
}

impl Default for ProcessedIdCache {
    fn default() -> Self {
        Self::new()
    }
}
