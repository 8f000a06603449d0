//! Validating relay handler.
//!
//! Validates each event and emits accepted ones as a structured log record.
//! Malformed events fail with [`ProcessingError::Invalid`], which the batch
//! consumer treats as permanent and discards.

use async_trait::async_trait;
use serde::Serialize;
use shared_bus::QueuedMessage;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

use crate::domain::ProcessingError;
use crate::ports::outbound::MessageHandler;

/// Counters kept by [`ValidatingHandler`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HandlerStats {
    pub accepted: u64,
    pub rejected: u64,
}

/// Handler that validates and logs events.
#[derive(Debug, Default)]
pub struct ValidatingHandler {
    accepted: AtomicU64,
    rejected: AtomicU64,
}

impl ValidatingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> HandlerStats {
        HandlerStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl MessageHandler for ValidatingHandler {
    async fn handle(&self, message: &QueuedMessage) -> Result<(), ProcessingError> {
        let event = &message.event;

        if let Err(e) = event.validate() {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            warn!(
                request_id = %event.request_id(),
                event_type = %event.event_type(),
                receive_count = message.receive_count,
                error = %e,
                "Rejected invalid event"
            );
            return Err(e.into());
        }

        let body = serde_json::to_string(event)
            .map_err(|e| ProcessingError::Rejected(format!("unserializable event: {e}")))?;

        self.accepted.fetch_add(1, Ordering::Relaxed);
        info!(
            request_id = %event.request_id(),
            event_type = %event.event_type(),
            store_id = event.store_id(),
            category = event.category(),
            sales_amount = event.sales_amount(),
            event = %body,
            "Accepted event"
        );
        Ok(())
    }
}
