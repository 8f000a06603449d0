//! Outbound (Driven) ports for the Batch Consumer subsystem.

use async_trait::async_trait;
use shared_bus::QueuedMessage;

use crate::domain::ProcessingError;

pub use shared_types::{SystemTimeSource, TimeSource};

/// Per-entry business logic.
///
/// Called once per drained entry. An `Err` sends the entry back for
/// redelivery; it never aborts the batch.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: &QueuedMessage) -> Result<(), ProcessingError>;
}
