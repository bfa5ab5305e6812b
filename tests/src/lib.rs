//! # Oracle Committee Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/               # Criterion benchmarks per subsystem
//! └── src/integration/       # Cross-subsystem flows
//!     ├── committee_flows.rs # executor + health reporter + cooldown cache
//!     └── config_epochs.rs   # digests, trackers and reconfiguration
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p oc-tests
//!
//! # By flow
//! cargo test -p oc-tests integration::config_epochs
//!
//! # Benchmarks
//! cargo bench -p oc-tests
//! ```

pub mod integration;
