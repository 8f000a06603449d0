//! # Store Events Test Suite
//!
//! Cross-crate tests for the producer → broker → queue → consumer pipeline.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── mod.rs            # Shared fixtures (recording transport, handlers)
//!     ├── pipeline_flows.rs # End-to-end publish/filter/drain flows
//!     ├── properties.rs     # Pipeline-wide properties
//!     └── concurrency.rs    # Concurrent drain/publish behaviour
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p se-tests
//! cargo test -p se-tests integration::properties::
//! ```

#![allow(dead_code)]
