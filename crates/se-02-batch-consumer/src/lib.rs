//! # Batch Consumer Subsystem
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Drains a subscription queue in bounded batches and hands each entry to a
//! [`MessageHandler`]. Failures are isolated per entry: successful entries
//! are acknowledged, retryable failures are returned to the queue front for
//! redelivery and permanent failures are discarded.
//!
//! ## Delivery Semantics
//!
//! | Outcome | Effect |
//! |---------|--------|
//! | Handler `Ok` | Entry acknowledged, `request_id` remembered for this queue |
//! | Handler `Err(Transient)` | Entry requeued at the front, keeps relative order |
//! | Handler `Err(Invalid / Rejected)` | Entry discarded, counted in `discarded` |
//! | `request_id` already processed on this queue | Entry acknowledged without calling the handler |
//! | Queue closed | `ConsumerError::QueueUnavailable` |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  adapters/validating.rs - ValidatingHandler                     │
//! │  service.rs             - BatchConsumerService                  │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - BatchConsumerApi trait                     │
//! │  ports/outbound.rs - MessageHandler, TimeSource                 │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  domain/config.rs  - ConsumerConfig                             │
//! │  domain/result.rs  - BatchResult, ItemFailure                   │
//! │  domain/errors.rs  - ProcessingError, ConsumerError             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{HandlerStats, ValidatingHandler};
pub use domain::*;
pub use ports::inbound::BatchConsumerApi;
pub use ports::outbound::MessageHandler;
pub use service::BatchConsumerService;
