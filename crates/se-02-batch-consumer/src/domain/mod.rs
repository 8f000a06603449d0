//! # Domain Layer - Batch Consumer
//!
//! - `config`: ConsumerConfig
//! - `result`: BatchResult, ItemFailure
//! - `errors`: ProcessingError (per item), ConsumerError (per batch)

pub mod config;
pub mod errors;
pub mod result;

pub use config::*;
pub use errors::*;
pub use result::*;
