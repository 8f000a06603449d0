//! # Event Producer Subsystem
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Generates a time-boxed stream of synthetic store events, tags each with
//! routing attributes and publishes it through an [`EventTransport`]. A
//! configurable share of events is deliberately malformed so downstream
//! consumers exercise their failure paths.
//!
//! ## Run Loop
//!
//! ```text
//! ┌─→ deadline reached? ──yes──→ return ProducerRunResult
//! │        │ no
//! │   max_messages emitted? ──yes──→ return ProducerRunResult
//! │        │ no
//! │   generate event (type, order kind, malformed coin)
//! │        │
//! │   publish(event, attributes)
//! │        ├── Ok(receipt)      → count
//! │        ├── Rejected         → record failure, continue
//! │        └── Unavailable      → abort with ProducerError
//! └────────┘
//! ```
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  service.rs        - EventProducerService (implements the port) │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - EventProducerApi trait                     │
//! │  ports/outbound.rs - EventTransport, TimeSource                 │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  domain/config.rs  - ProducerConfig                             │
//! │  domain/result.rs  - ProducerRunResult                          │
//! │  domain/errors.rs  - ProducerError                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`EventTransport`]: shared_bus::EventTransport

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::*;
pub use ports::inbound::EventProducerApi;
pub use service::EventProducerService;
