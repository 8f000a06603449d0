//! # Pipeline Runtime Library
//!
//! Wires one store events pipeline and runs it once, the way a scheduler
//! would invoke it:
//!
//! 1. Build the broker and its subscription queues
//! 2. Run the producer until `now + run_budget_ms` or the message cap
//! 3. Poll each queue with the batch consumer until empty or `max_polls`
//! 4. Return a [`PipelineReport`]
//!
//! The binary in `main.rs` adds telemetry and environment configuration.

pub mod container;
pub mod wiring;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::Instrument;

use se_01_event_producer::{EventProducerApi, EventProducerService, ProducerRunResult};
use se_02_batch_consumer::{
    BatchConsumerApi, BatchConsumerService, BatchResult, HandlerStats, ValidatingHandler,
};
use shared_bus::{BrokerStats, EventQueue, FilteringBroker, QueueStats};
use shared_types::{SystemTimeSource, TimeSource};
use store_telemetry::{component_span, log_event, log_queue_event};

pub use container::{ConfigError, PipelineConfig};
pub use wiring::{default_subscriptions, SubscriptionSpec};

/// What the consumer did with one queue.
#[derive(Debug, Clone, Serialize)]
pub struct QueueReport {
    pub queue: String,
    /// Batches polled, including a final empty one.
    pub batches: usize,
    pub totals: BatchResult,
    /// Entries still queued when polling stopped.
    pub remaining: usize,
    pub stats: QueueStats,
}

/// Summary of one pipeline invocation.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub producer: ProducerRunResult,
    pub broker: BrokerStats,
    pub queues: Vec<QueueReport>,
    pub handler: HandlerStats,
}

impl PipelineReport {
    pub fn queue(&self, name: &str) -> Option<&QueueReport> {
        self.queues.iter().find(|q| q.queue == name)
    }
}

/// The wired pipeline.
pub struct PipelineRuntime<C: TimeSource + 'static = SystemTimeSource> {
    config: PipelineConfig,
    clock: Arc<C>,
    broker: Arc<FilteringBroker>,
    queues: Vec<Arc<EventQueue>>,
    producer: EventProducerService<FilteringBroker, C>,
    consumer: BatchConsumerService<ValidatingHandler, C>,
}

impl PipelineRuntime<SystemTimeSource> {
    /// Wire the default subscriptions against the system clock.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_clock(config, &default_subscriptions(), Arc::new(SystemTimeSource))
    }
}

impl<C: TimeSource + 'static> PipelineRuntime<C> {
    /// Wire `subscriptions` against an explicit clock.
    pub fn with_clock(
        config: PipelineConfig,
        subscriptions: &[SubscriptionSpec],
        clock: Arc<C>,
    ) -> Result<Self> {
        let wired = wiring::wire_broker(
            config.broker.clone(),
            &config.queue,
            subscriptions,
            clock.clone(),
        )
        .context("Failed to register subscriptions")?;

        let producer = EventProducerService::new(
            config.producer.clone(),
            Arc::clone(&wired.broker),
            clock.clone(),
        );
        let consumer = BatchConsumerService::new(
            config.consumer.clone(),
            Arc::new(ValidatingHandler::new()),
            clock.clone(),
        );

        Ok(Self {
            config,
            clock,
            broker: wired.broker,
            queues: wired.queues,
            producer,
            consumer,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn broker(&self) -> &Arc<FilteringBroker> {
        &self.broker
    }

    pub fn queues(&self) -> &[Arc<EventQueue>] {
        &self.queues
    }

    pub fn queue(&self, name: &str) -> Option<&Arc<EventQueue>> {
        self.queues.iter().find(|q| q.name() == name)
    }

    /// Run the producer once, then drain every queue.
    pub async fn run_once(&self) -> Result<PipelineReport> {
        let started_at = Utc::now();
        let timer = Instant::now();
        let deadline = self.clock.now().saturating_add(self.config.run_budget_ms);

        let producer = self
            .producer
            .run(
                deadline,
                self.config.producer.max_messages,
                self.config.effective_malformed_rate(),
            )
            .instrument(component_span!("produce", component = "producer"))
            .await
            .context("Producer run failed")?;

        log_event!(
            info,
            "runtime",
            "Producer finished",
            emitted = producer.total_messages,
            malformed = producer.malformed_messages,
            unmatched = producer.unmatched_messages
        );

        let mut queues = Vec::with_capacity(self.queues.len());
        for queue in &self.queues {
            let report = self
                .drain_queue(queue)
                .instrument(component_span!(
                    "drain",
                    component = "consumer",
                    queue = queue.name()
                ))
                .await
                .with_context(|| format!("Failed to drain {}", queue.name()))?;
            queues.push(report);
        }

        Ok(PipelineReport {
            started_at,
            duration_ms: u64::try_from(timer.elapsed().as_millis()).unwrap_or(u64::MAX),
            producer,
            broker: self.broker.stats(),
            queues,
            handler: self.consumer.handler().stats(),
        })
    }

    async fn drain_queue(&self, queue: &EventQueue) -> Result<QueueReport> {
        let mut totals = BatchResult::default();
        let mut batches = 0;

        while batches < self.config.max_polls && !queue.is_empty() {
            let batch = self.consumer.process_next_batch(queue).await?;
            batches += 1;
            if batch.is_empty() {
                break;
            }
            totals.merge(batch);
        }

        let remaining = queue.len();
        if remaining > 0 {
            log_queue_event!(
                warn,
                "runtime",
                "Polling stopped with entries left",
                queue.name(),
                remaining = remaining,
                batches = batches
            );
        }

        Ok(QueueReport {
            queue: queue.name().to_string(),
            batches,
            totals,
            remaining,
            stats: queue.stats(),
        })
    }

    /// Stop the broker and close every queue.
    pub fn shutdown(&self) {
        self.broker.shutdown();
        for queue in &self.queues {
            queue.close();
        }
        log_event!(info, "runtime", "Pipeline shut down");
    }
}
