//! # Subscription Wiring
//!
//! Builds the broker and its subscription queues from a static list.
//!
//! ```text
//!                      ┌──────────────────┐
//!   producer ────────→ │ FilteringBroker  │
//!                      └────────┬─────────┘
//!          {evnt_type: [sales-event]}   {evnt_type: [inventory-event]}
//!                   ↓                            ↓
//!              ┌─────────┐                ┌─────────────┐
//!              │ sales_q │                │ inventory_q │
//!              └─────────┘                └─────────────┘
//! ```

pub mod subscriptions;

pub use subscriptions::{default_subscriptions, wire_broker, SubscriptionSpec, WiredBroker};
