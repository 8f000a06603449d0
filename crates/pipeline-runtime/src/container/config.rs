//! # Pipeline Configuration
//!
//! Unified configuration for one pipeline invocation.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SE_MAX_MSGS_TO_PRODUCE` | `5` | Events per producer run |
//! | `SE_RUN_BUDGET_MS` | `1000` | Producer deadline, relative to start |
//! | `SE_MALFORMED_RATE` | `0.10` | Share of deliberately malformed events |
//! | `SE_TRIGGER_RANDOM_FAILURES` | `true` | `false` forces the malformed rate to 0 |
//! | `SE_SEED` | unset | RNG seed for reproducible runs |
//! | `SE_BATCH_SIZE` | `5` | Entries per consumer batch |
//! | `SE_MAX_POLLS` | `10` | Batches per queue before giving up |
//! | `SE_QUEUE_CAPACITY` | unset | Per-queue capacity (unbounded when unset) |
//! | `SE_RETENTION_MS` | 2 days | Queue retention window |
//! | `SE_DELIVERY_DELAY_MS` | `0` | Queue delivery delay |

use std::env;
use std::str::FromStr;

use se_01_event_producer::ProducerConfig;
use se_02_batch_consumer::ConsumerConfig;
use serde::{Deserialize, Serialize};
use shared_bus::{BrokerConfig, QueueConfig};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable does not parse.
    #[error("{var}={value:?} is not a valid value")]
    InvalidValue { var: &'static str, value: String },

    /// A value parses but is out of range.
    #[error("{field} {reason}")]
    OutOfRange { field: &'static str, reason: String },
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Producer configuration, including the per-run message cap.
    pub producer: ProducerConfig,
    /// Time the producer may run for.
    pub run_budget_ms: u64,
    /// When false the producer emits no malformed events.
    pub trigger_random_failures: bool,
    /// Consumer configuration.
    pub consumer: ConsumerConfig,
    /// Batches per queue before the runtime stops polling.
    pub max_polls: usize,
    /// Configuration shared by every subscription queue.
    pub queue: QueueConfig,
    /// Broker limits.
    pub broker: BrokerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            producer: ProducerConfig::default(),
            run_budget_ms: 1_000,
            trigger_random_failures: true,
            consumer: ConsumerConfig::default(),
            max_polls: 10,
            queue: QueueConfig::default(),
            broker: BrokerConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// Unset variables keep their defaults; set but unparsable ones fail.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = parse(&lookup, "SE_MAX_MSGS_TO_PRODUCE")? {
            config.producer.max_messages = v;
        }
        if let Some(v) = parse(&lookup, "SE_RUN_BUDGET_MS")? {
            config.run_budget_ms = v;
        }
        if let Some(v) = parse(&lookup, "SE_MALFORMED_RATE")? {
            config.producer.malformed_rate = v;
        }
        if let Some(v) = parse_flag(&lookup, "SE_TRIGGER_RANDOM_FAILURES")? {
            config.trigger_random_failures = v;
        }
        if let Some(v) = parse(&lookup, "SE_SEED")? {
            config.producer.seed = Some(v);
        }
        if let Some(v) = parse(&lookup, "SE_BATCH_SIZE")? {
            config.consumer.batch_size = v;
        }
        if let Some(v) = parse(&lookup, "SE_MAX_POLLS")? {
            config.max_polls = v;
        }
        if let Some(v) = parse(&lookup, "SE_QUEUE_CAPACITY")? {
            config.queue.capacity = Some(v);
        }
        if let Some(v) = parse(&lookup, "SE_RETENTION_MS")? {
            config.queue.retention_ms = v;
        }
        if let Some(v) = parse(&lookup, "SE_DELIVERY_DELAY_MS")? {
            config.queue.delivery_delay_ms = v;
        }

        Ok(config)
    }

    /// Validate configuration before wiring.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.producer.validate().is_err() {
            return Err(ConfigError::OutOfRange {
                field: "malformed_rate",
                reason: format!("{} is outside [0, 1]", self.producer.malformed_rate),
            });
        }
        if self.consumer.batch_size == 0 {
            return Err(out_of_range("batch_size", "must be at least 1"));
        }
        if self.max_polls == 0 {
            return Err(out_of_range("max_polls", "must be at least 1"));
        }
        if self.queue.capacity == Some(0) {
            return Err(out_of_range("queue capacity", "must be at least 1"));
        }
        if self.queue.retention_ms == 0 {
            return Err(out_of_range("retention_ms", "must be positive"));
        }
        if self.queue.delivery_delay_ms >= self.queue.retention_ms {
            return Err(out_of_range(
                "delivery_delay_ms",
                "must be shorter than the retention window",
            ));
        }
        Ok(())
    }

    /// Malformed rate the producer actually runs with.
    #[must_use]
    pub fn effective_malformed_rate(&self) -> f64 {
        if self.trigger_random_failures {
            self.producer.malformed_rate
        } else {
            0.0
        }
    }
}

fn out_of_range(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::OutOfRange {
        field,
        reason: reason.to_string(),
    }
}

fn parse<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(var)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { var, value })
        })
        .transpose()
}

fn parse_flag<F>(lookup: &F, var: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|value| match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidValue { var, value }),
        })
        .transpose()
}
