//! Producer error types.
//!
//! Per-message publish failures are not errors here: they are recorded in
//! [`ProducerRunResult`](super::ProducerRunResult). Only run-level faults
//! surface as [`ProducerError`].

use thiserror::Error;

/// Producer error type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProducerError {
    /// The malformed-event probability is not in [0, 1].
    #[error("Malformed rate {0} is outside [0, 1]")]
    InvalidMalformedRate(f64),

    /// The publish channel is down; the run was aborted.
    #[error("Publish channel unavailable after {emitted} events: {reason}")]
    TransportUnavailable { reason: String, emitted: u64 },
}
