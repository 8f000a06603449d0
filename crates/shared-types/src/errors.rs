//! # Error Types
//!
//! Defines error types for the event model.

use thiserror::Error;
use uuid::Uuid;

/// An event violates the model invariants.
///
/// Non-fatal: the producer generates some of these on purpose.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The event has no store id.
    #[error("Event {request_id} has no store_id")]
    MissingStoreId { request_id: Uuid },

    /// The store id is outside the valid range.
    #[error("Event {request_id} has store_id {store_id} outside 1..=10")]
    StoreIdOutOfRange { request_id: Uuid, store_id: u8 },

    /// The event is flagged malformed but still carries a store id.
    #[error("Event {request_id} is flagged malformed but carries a store_id")]
    MalformedWithStoreId { request_id: Uuid },

    /// The category is not in the catalogue.
    #[error("Event {request_id} has unknown category {category:?}")]
    UnknownCategory { request_id: Uuid, category: String },

    /// The quantity is below one.
    #[error("Event {request_id} has invalid quantity {quantity}")]
    InvalidQuantity { request_id: Uuid, quantity: u32 },

    /// The event type name is not recognised.
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),
}
