//! # Event Queue
//!
//! Per-subscription holding buffer between the broker and a batch consumer.
//!
//! ## Concurrency
//!
//! - All mutation (`enqueue`, `drain`, `requeue`, `close`) is serialized by one mutex
//! - `drain` is a single atomic pop of up to N entries; there is no peek step
//! - `len` reads an atomic mirror of the depth and may lag concurrent mutation
//!
//! ## Lifecycle of an entry
//!
//! ```text
//! enqueue ──→ [delayed] ──visible_at──→ [visible] ──drain──→ consumer
//!                                          ↑                    │
//!                                          └──── requeue ───────┘ (on failure)
//!
//! any state ──retention elapsed──→ discarded at next drain
//! ```

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared_types::{Event, RoutingAttributes, TimeSource, Timestamp};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::DEFAULT_RETENTION_MS;

/// Errors from queue operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The queue reached its configured capacity.
    #[error("Queue {queue} is full (capacity {capacity})")]
    Full { queue: String, capacity: usize },

    /// The queue was closed and no longer accepts operations.
    #[error("Queue {queue} is closed")]
    Closed { queue: String },
}

/// Queue configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum entries held at once. `None` means unbounded.
    pub capacity: Option<usize>,
    /// Entries older than this (since first enqueue) are discarded.
    pub retention_ms: u64,
    /// New entries stay invisible to `drain` for this long.
    pub delivery_delay_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: None,
            retention_ms: DEFAULT_RETENTION_MS,
            delivery_delay_ms: 0,
        }
    }
}

/// An entry held by a queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedMessage {
    /// Broker-assigned message id (shared by every queue the event reached).
    pub message_id: Uuid,
    pub event: Event,
    pub attributes: RoutingAttributes,
    /// When the entry was first enqueued.
    pub enqueued_at: Timestamp,
    /// Earliest time `drain` may hand the entry out.
    pub visible_at: Timestamp,
    /// Number of times the entry was drained, including the current delivery.
    pub receive_count: u32,
}

/// Queue counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub depth: usize,
    pub enqueued: u64,
    pub drained: u64,
    pub requeued: u64,
    pub expired: u64,
}

#[derive(Debug, Default)]
struct QueueState {
    buffer: VecDeque<QueuedMessage>,
    closed: bool,
    stats: QueueStats,
}

/// Bounded, time-limited FIFO of events awaiting consumption.
pub struct EventQueue {
    name: String,
    config: QueueConfig,
    clock: Arc<dyn TimeSource>,
    state: Mutex<QueueState>,
    /// Depth mirror for lock-free `len()`.
    depth: AtomicUsize,
}

impl EventQueue {
    /// Create a queue.
    pub fn new(name: impl Into<String>, config: QueueConfig, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            name: name.into(),
            config,
            clock,
            state: Mutex::new(QueueState::default()),
            depth: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Append an entry at the back.
    ///
    /// # Errors
    ///
    /// - `QueueError::Full` - capacity reached
    /// - `QueueError::Closed` - queue closed
    pub fn enqueue(
        &self,
        message_id: Uuid,
        event: Event,
        attributes: RoutingAttributes,
    ) -> Result<(), QueueError> {
        let now = self.clock.now();
        let mut state = self.state.lock();

        if state.closed {
            return Err(self.closed_error());
        }
        if let Some(capacity) = self.config.capacity {
            if state.buffer.len() >= capacity {
                return Err(QueueError::Full {
                    queue: self.name.clone(),
                    capacity,
                });
            }
        }

        state.buffer.push_back(QueuedMessage {
            message_id,
            event,
            attributes,
            enqueued_at: now,
            visible_at: now.saturating_add(self.config.delivery_delay_ms),
            receive_count: 0,
        });
        state.stats.enqueued += 1;
        self.sync_depth(&mut state);
        Ok(())
    }

    /// Atomically remove up to `max_items` visible entries from the front.
    ///
    /// Entries past the retention window are discarded first.
    ///
    /// # Errors
    ///
    /// - `QueueError::Closed` - queue closed
    pub fn drain(&self, max_items: usize) -> Result<Vec<QueuedMessage>, QueueError> {
        let now = self.clock.now();
        let mut state = self.state.lock();

        if state.closed {
            return Err(self.closed_error());
        }

        self.purge_expired(&mut state, now);

        // Visibility is monotonic from the front: requeued entries were
        // already visible and new entries share one delay.
        let visible = state
            .buffer
            .iter()
            .take(max_items)
            .take_while(|m| m.visible_at <= now)
            .count();

        let batch: Vec<QueuedMessage> = state
            .buffer
            .drain(..visible)
            .map(|mut m| {
                m.receive_count = m.receive_count.saturating_add(1);
                m
            })
            .collect();

        state.stats.drained += batch.len() as u64;
        self.sync_depth(&mut state);

        debug!(queue = %self.name, drained = batch.len(), "Queue drained");
        Ok(batch)
    }

    /// Reinsert entries at the front, preserving their relative order.
    ///
    /// Capacity is not checked: the entries were already admitted once.
    ///
    /// # Errors
    ///
    /// - `QueueError::Closed` - queue closed
    pub fn requeue(&self, items: Vec<QueuedMessage>) -> Result<(), QueueError> {
        let mut state = self.state.lock();

        if state.closed {
            return Err(self.closed_error());
        }

        let count = items.len();
        for item in items.into_iter().rev() {
            state.buffer.push_front(item);
        }
        state.stats.requeued += count as u64;
        self.sync_depth(&mut state);

        debug!(queue = %self.name, requeued = count, "Entries returned for redelivery");
        Ok(())
    }

    /// Current depth. Eventually consistent with concurrent mutation.
    pub fn len(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close the queue. Pending entries are kept but no longer reachable.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if !state.closed {
            state.closed = true;
            warn!(queue = %self.name, depth = state.buffer.len(), "Queue closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn stats(&self) -> QueueStats {
        let state = self.state.lock();
        QueueStats {
            depth: state.buffer.len(),
            ..state.stats
        }
    }

    fn purge_expired(&self, state: &mut QueueState, now: Timestamp) {
        let retention = self.config.retention_ms;
        let before = state.buffer.len();
        state
            .buffer
            .retain(|m| now.saturating_sub(m.enqueued_at) < retention);
        let expired = before - state.buffer.len();

        if expired > 0 {
            state.stats.expired += expired as u64;
            warn!(
                queue = %self.name,
                expired = expired,
                retention_ms = retention,
                "Discarded entries past retention window"
            );
        }
    }

    fn sync_depth(&self, state: &mut QueueState) {
        self.depth.store(state.buffer.len(), Ordering::Relaxed);
    }

    fn closed_error(&self) -> QueueError {
        QueueError::Closed {
            queue: self.name.clone(),
        }
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("depth", &self.len())
            .finish()
    }
}
