//! Ports for the Event Producer subsystem.
//!
//! - `inbound`: EventProducerApi (driving port)
//! - `outbound`: EventTransport, TimeSource (driven ports)

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
