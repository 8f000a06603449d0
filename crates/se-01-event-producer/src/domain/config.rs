//! Producer configuration.

use serde::{Deserialize, Serialize};

use super::errors::ProducerError;

/// Configuration for the event producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Stop this long before the deadline so the invocation can still report.
    pub deadline_margin_ms: u64,
    /// Default cap on events per run.
    pub max_messages: u64,
    /// Default probability that an event is malformed.
    pub malformed_rate: f64,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            deadline_margin_ms: 100,
            max_messages: 5,
            malformed_rate: 0.10,
        }
    }
}

impl ProducerConfig {
    /// Check a malformed rate is a valid probability.
    pub fn check_malformed_rate(rate: f64) -> Result<(), ProducerError> {
        if (0.0..=1.0).contains(&rate) {
            Ok(())
        } else {
            Err(ProducerError::InvalidMalformedRate(rate))
        }
    }

    /// Validate the configured defaults.
    pub fn validate(&self) -> Result<(), ProducerError> {
        Self::check_malformed_rate(self.malformed_rate)
    }
}
