//! # Shared Types Crate
//!
//! This crate contains the store event model used by every stage of the
//! pipeline, as well as the time source abstraction.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Attributes Are Not Body**: Brokers filter on [`RoutingAttributes`],
//!   never on event body content.
//! - **Immutable Identity**: `request_id` and `event_type` cannot change after
//!   an [`Event`] is created.

pub mod entities;
pub mod errors;
pub mod factory;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use factory::{new_event, EventFactory};
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource, Timestamp};
