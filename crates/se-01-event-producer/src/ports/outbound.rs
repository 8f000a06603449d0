//! Outbound (Driven) ports for the Event Producer subsystem.
//!
//! The producer depends on a publish transport and a time source. Both are
//! defined in the shared crates; the filtering broker is the production
//! transport.

pub use shared_bus::{EventTransport, PublishReceipt, TransportError};
pub use shared_types::{SystemTimeSource, TimeSource};

/// Scripted transport for testing.
#[cfg(test)]
pub struct ScriptedTransport {
    pub published: parking_lot::Mutex<Vec<(shared_types::Event, shared_types::RoutingAttributes)>>,
    /// Reject every publish whose 1-based index is a multiple of this.
    pub reject_every: Option<u64>,
    /// Fail as unavailable once this many publishes were attempted.
    pub unavailable_after: Option<u64>,
    attempts: std::sync::atomic::AtomicU64,
}

#[cfg(test)]
impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            published: parking_lot::Mutex::new(Vec::new()),
            reject_every: None,
            unavailable_after: None,
            attempts: std::sync::atomic::AtomicU64::new(0),
        }
    }

    pub fn rejecting_every(mut self, n: u64) -> Self {
        self.reject_every = Some(n);
        self
    }

    pub fn unavailable_after(mut self, n: u64) -> Self {
        self.unavailable_after = Some(n);
        self
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl EventTransport for ScriptedTransport {
    async fn publish(
        &self,
        event: shared_types::Event,
        attributes: shared_types::RoutingAttributes,
    ) -> Result<PublishReceipt, TransportError> {
        let attempt = self
            .attempts
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
            + 1;

        if self.unavailable_after.is_some_and(|n| attempt > n) {
            return Err(TransportError::Unavailable {
                reason: "scripted outage".to_string(),
            });
        }
        if self.reject_every.is_some_and(|n| attempt % n == 0) {
            return Err(TransportError::Rejected {
                reason: "scripted rejection".to_string(),
            });
        }

        self.published.lock().push((event, attributes));
        Ok(PublishReceipt {
            message_id: uuid::Uuid::new_v4(),
            matched: Vec::new(),
            failures: Vec::new(),
        })
    }
}
