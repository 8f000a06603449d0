//! # Pipeline Container
//!
//! Configuration for the runtime and every component it wires.
//!
//! - Core crates never read the environment; this module is the only place
//!   environment variables are turned into config structs

pub mod config;

pub use config::{ConfigError, PipelineConfig};
