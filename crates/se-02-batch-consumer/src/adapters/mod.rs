//! Adapters layer for the Batch Consumer subsystem.
//!
//! Handler implementations plugged into [`MessageHandler`](crate::ports::MessageHandler).

pub mod validating;

pub use validating::{HandlerStats, ValidatingHandler};
