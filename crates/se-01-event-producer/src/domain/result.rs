//! Run summary returned by every producer invocation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use shared_types::EventType;
use uuid::Uuid;

/// Upper bound on individually recorded publish failures per run.
pub const MAX_RECORDED_FAILURES: usize = 100;

/// One message the transport refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishFailure {
    pub request_id: Uuid,
    pub error: String,
}

/// Counters for one producer run.
///
/// Event counters (`total_messages`, `malformed_messages`, `sales_events`,
/// `inventory_events`, `total_sales_cents`) cover every emitted event,
/// whether or not its publish succeeded. The sales total is kept in cents and
/// serialized as the decimal `total_sales_amount`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerRunResult {
    pub total_messages: u64,
    pub malformed_messages: u64,
    pub sales_events: u64,
    pub inventory_events: u64,
    #[serde(rename = "total_sales_amount", with = "cents_as_amount")]
    pub total_sales_cents: u64,
    /// Publishes the transport accepted.
    pub published_messages: u64,
    /// Publishes accepted but matched by no subscription.
    pub unmatched_messages: u64,
    /// Publishes the transport refused.
    pub failed_messages: u64,
    /// First [`MAX_RECORDED_FAILURES`] refusals.
    pub publish_failures: Vec<PublishFailure>,
    /// Whether the run stopped on the deadline rather than the message cap.
    pub deadline_reached: bool,
}

impl ProducerRunResult {
    /// Total sales amount in currency units.
    #[must_use]
    pub fn total_sales_amount(&self) -> f64 {
        self.total_sales_cents as f64 / 100.0
    }

    pub(crate) fn record_event(&mut self, event_type: EventType, malformed: bool, sales_cents: u64) {
        self.total_messages += 1;
        if malformed {
            self.malformed_messages += 1;
        }
        match event_type {
            EventType::Sales => self.sales_events += 1,
            EventType::Inventory => self.inventory_events += 1,
        }
        self.total_sales_cents += sales_cents;
    }

    pub(crate) fn record_failure(&mut self, request_id: Uuid, error: String) {
        self.failed_messages += 1;
        if self.publish_failures.len() < MAX_RECORDED_FAILURES {
            self.publish_failures.push(PublishFailure { request_id, error });
        }
    }
}

/// Cents on the wire as a two-decimal currency amount.
mod cents_as_amount {
    use super::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(cents: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(*cents as f64 / 100.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(serde::de::Error::custom(format!(
                "invalid sales amount: {amount}"
            )));
        }
        Ok((amount * 100.0).round() as u64)
    }
}
