//! Ports for the Batch Consumer subsystem.
//!
//! - `inbound`: BatchConsumerApi (driving port)
//! - `outbound`: MessageHandler, TimeSource (driven ports)

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
