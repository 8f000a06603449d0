//! # Inbound Port - EventProducerApi
//!
//! Driving port invoked once per scheduled producer run.

use async_trait::async_trait;
use shared_types::Timestamp;

use crate::domain::{ProducerError, ProducerRunResult};

/// Primary API for the Event Producer subsystem.
///
/// # Example
///
/// ```rust,ignore
/// use se_01_event_producer::EventProducerApi;
///
/// async fn invoke(producer: &impl EventProducerApi, now: u64) {
///     // One second budget, at most 5 events, 10% malformed.
///     let result = producer.run(now + 1_000, 5, 0.10).await?;
///     println!("emitted {}", result.total_messages);
/// }
/// ```
#[async_trait]
pub trait EventProducerApi: Send + Sync {
    /// Generate and publish events until `deadline` (milliseconds since the
    /// epoch) or `max_messages`, whichever comes first.
    ///
    /// The deadline is checked before every event.
    ///
    /// # Errors
    /// - `InvalidMalformedRate`: `malformed_rate` outside [0, 1]
    /// - `TransportUnavailable`: the publish channel failed as a whole
    async fn run(
        &self,
        deadline: Timestamp,
        max_messages: u64,
        malformed_rate: f64,
    ) -> Result<ProducerRunResult, ProducerError>;
}
