//! Consumer error types.

use shared_types::ValidationError;
use thiserror::Error;

/// Why a handler could not process one entry.
///
/// Always recovered by the consumer. Retryable failures return the entry to
/// its queue; permanent ones discard it so it cannot block the entries
/// behind it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessingError {
    /// The event failed validation.
    #[error("Invalid event: {0}")]
    Invalid(#[from] ValidationError),

    /// A downstream dependency failed; a retry may succeed.
    #[error("Transient failure: {0}")]
    Transient(String),

    /// The handler refused the event.
    #[error("Rejected: {0}")]
    Rejected(String),
}

impl ProcessingError {
    /// Whether another delivery of the same entry could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Batch-level consumer errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsumerError {
    /// The queue cannot be reached; nothing was (or could be) returned to it.
    #[error("Queue {queue} unavailable: {reason}")]
    QueueUnavailable { queue: String, reason: String },
}
