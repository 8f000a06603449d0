//! # Event Producer Service
//!
//! Implements [`EventProducerApi`] on top of an [`EventTransport`] and a
//! [`TimeSource`].
//!
//! ## Thread Safety
//!
//! The service can be shared via `Arc`. The event factory sits behind a
//! mutex that is released before every publish await.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use std::sync::Arc;
use tracing::{error, info, warn};

use shared_types::{Event, EventFactory, Timestamp};

use crate::domain::{ProducerConfig, ProducerError, ProducerRunResult};
use crate::ports::inbound::EventProducerApi;
use crate::ports::outbound::{EventTransport, TimeSource};

/// Event Producer Service.
pub struct EventProducerService<T, C>
where
    T: EventTransport,
    C: TimeSource,
{
    config: ProducerConfig,
    transport: Arc<T>,
    clock: Arc<C>,
    factory: Mutex<EventFactory>,
}

impl<T, C> EventProducerService<T, C>
where
    T: EventTransport,
    C: TimeSource,
{
    pub fn new(config: ProducerConfig, transport: Arc<T>, clock: Arc<C>) -> Self {
        let factory = EventFactory::new(config.seed);
        Self {
            config,
            transport,
            clock,
            factory: Mutex::new(factory),
        }
    }

    pub fn config(&self) -> &ProducerConfig {
        &self.config
    }

    /// Run with the configured message cap and malformed rate.
    pub async fn run_with_defaults(
        &self,
        deadline: Timestamp,
    ) -> Result<ProducerRunResult, ProducerError> {
        self.run(deadline, self.config.max_messages, self.config.malformed_rate)
            .await
    }

    fn deadline_reached(&self, deadline: Timestamp) -> bool {
        self.clock
            .now()
            .saturating_add(self.config.deadline_margin_ms)
            >= deadline
    }

    /// Draw the next event and decide whether to corrupt it.
    fn generate(&self, malformed_rate: f64) -> (Event, bool) {
        let mut factory = self.factory.lock();
        let event = factory.next_event();
        let malformed = factory.rng().gen_bool(malformed_rate);

        if malformed {
            (event.into_malformed(), true)
        } else {
            (event, false)
        }
    }
}

#[async_trait]
impl<T, C> EventProducerApi for EventProducerService<T, C>
where
    T: EventTransport,
    C: TimeSource,
{
    async fn run(
        &self,
        deadline: Timestamp,
        max_messages: u64,
        malformed_rate: f64,
    ) -> Result<ProducerRunResult, ProducerError> {
        ProducerConfig::check_malformed_rate(malformed_rate)?;

        let mut result = ProducerRunResult::default();

        loop {
            if self.deadline_reached(deadline) {
                result.deadline_reached = true;
                break;
            }
            if result.total_messages >= max_messages {
                break;
            }

            let (event, malformed) = self.generate(malformed_rate);
            let request_id = event.request_id();
            let event_type = event.event_type();
            let sales_cents = event.sales_amount_cents();
            let attributes = event.routing_attributes();

            match self.transport.publish(event, attributes).await {
                Ok(receipt) => {
                    result.published_messages += 1;
                    if receipt.is_unmatched() {
                        result.unmatched_messages += 1;
                    }
                }
                Err(e) if e.is_fatal() => {
                    error!(
                        request_id = %request_id,
                        emitted = result.total_messages,
                        error = %e,
                        "Publish channel unavailable, aborting run"
                    );
                    return Err(ProducerError::TransportUnavailable {
                        reason: e.to_string(),
                        emitted: result.total_messages,
                    });
                }
                Err(e) => {
                    warn!(request_id = %request_id, error = %e, "Publish failed");
                    result.record_failure(request_id, e.to_string());
                }
            }

            result.record_event(event_type, malformed, sales_cents);
        }

        info!(
            total_messages = result.total_messages,
            malformed_messages = result.malformed_messages,
            sales_events = result.sales_events,
            inventory_events = result.inventory_events,
            total_sales = result.total_sales_amount(),
            failed_messages = result.failed_messages,
            deadline_reached = result.deadline_reached,
            "Producer run complete"
        );

        Ok(result)
    }
}
