//! # Publish Transport
//!
//! The boundary producers publish through. The in-process
//! [`FilteringBroker`](crate::FilteringBroker) implements it; a networked
//! implementation would add retry/backoff here.

use async_trait::async_trait;
use shared_types::{Event, RoutingAttributes};
use thiserror::Error;

use crate::broker::PublishReceipt;

/// Errors from the publish transport.
///
/// `Rejected` concerns one message and is recoverable by the caller;
/// `Unavailable` means the channel itself is broken.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// This message was refused; the channel is still usable.
    #[error("Message rejected: {reason}")]
    Rejected { reason: String },

    /// The channel is down; no further message can be published.
    #[error("Transport unavailable: {reason}")]
    Unavailable { reason: String },
}

impl TransportError {
    /// Whether the error is a channel-level fault.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Trait for publishing events with their routing attributes.
#[async_trait]
pub trait EventTransport: Send + Sync {
    /// Publish an event.
    ///
    /// # Returns
    ///
    /// A receipt listing the subscriptions the event reached.
    async fn publish(
        &self,
        event: Event,
        attributes: RoutingAttributes,
    ) -> Result<PublishReceipt, TransportError>;
}
