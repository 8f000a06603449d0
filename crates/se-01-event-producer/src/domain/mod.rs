//! # Domain Layer - Event Producer
//!
//! - `config`: ProducerConfig
//! - `result`: ProducerRunResult, PublishFailure
//! - `errors`: ProducerError

pub mod config;
pub mod errors;
pub mod result;

pub use config::*;
pub use errors::*;
pub use result::*;
