//! # Shared Bus - Filtering Broker for Store Events
//!
//! Fans published events out to per-subscription queues according to
//! attribute-based filter policies.
//!
//! ## Fan-out Pattern
//!
//! ```text
//! ┌──────────────┐  publish(event, attrs)  ┌──────────────────┐
//! │   Producer   │ ──────────────────────→ │ FilteringBroker  │
//! └──────────────┘                         │  policy.matches? │
//!                                          └────────┬─────────┘
//!                               ┌───────────────────┼───────────────────┐
//!                               ↓ evnt_type=sales   ↓ evnt_type=inventory
//!                        ┌────────────┐       ┌──────────────┐
//!                        │  sales_q   │       │ inventory_q  │
//!                        └────────────┘       └──────────────┘
//!                               ↑ drain / requeue     ↑
//!                          Batch Consumer        Batch Consumer
//! ```
//!
//! ## Guarantees
//!
//! - **Per-queue FIFO:** events reach each matching queue in publish order
//! - **Isolated fan-out:** a failed append to one queue never blocks others
//! - **Atomic drain:** an entry is handed to at most one concurrent drain
//! - **Fan-out only:** events matching no policy are dropped, not dead-lettered

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod broker;
pub mod dedup_cache;
pub mod policy;
pub mod queue;
pub mod transport;

// Re-export main types
pub use broker::{
    BrokerConfig, BrokerError, BrokerStats, DeliveryFailure, FilteringBroker, PublishReceipt,
    SubscriptionHandle,
};
pub use dedup_cache::ProcessedIdCache;
pub use policy::SubscriptionFilterPolicy;
pub use queue::{EventQueue, QueueConfig, QueueError, QueueStats, QueuedMessage};
pub use transport::{EventTransport, TransportError};

/// Maximum routing attributes a single message may carry.
pub const MAX_ROUTING_ATTRIBUTES: usize = 10;

/// Maximum serialized event body size (256 KiB).
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 256 * 1024;

/// Default queue retention window (2 days).
pub const DEFAULT_RETENTION_MS: u64 = 2 * 24 * 60 * 60 * 1000;
