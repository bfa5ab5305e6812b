//! # Node Runtime Library
//!
//! Wires the oracle subsystems into one node and drives reporting rounds.
//! The `node-runtime` binary runs a local committee with the demo counter
//! plugin.
//!
//! ## Architecture
//!
//! ```text
//!   Config contract ──→ DigestTransformingTracker (oc-01)
//!                              │ notify / poll
//!                              ↓
//!                        OracleNode ──── OutcomeStore
//!                              │
//!          ┌───────────────────┼─────────────────────┐
//!          ↓                   ↓                     ↓
//!   RoundExecutor (oc-04)  HealthReporter (oc-03)  CooldownCache (oc-02)
//!          │                   ↑                     ↑
//!          │       round errors│                     │ report fingerprints
//!          └──→ CooldownTransmitter ─────────────────┘
//!                      │
//!                      ↓
//!               ContractTransmitter
//! ```
//!
//! ## Error Policy
//!
//! Round failures never stop the node. Each one is recorded in the health
//! reporter under the subsystem that produced it, and the next round runs
//! under the next sequence number. A digest mismatch additionally forces a
//! config re-read before that round.

pub mod adapters;
pub mod container;
pub mod error;
pub mod node;
pub mod ports;

pub use container::NodeConfig;
pub use error::{NodeError, NodeResult};
pub use node::{NodeStats, OracleNode};
pub use ports::{OutcomeStore, PersistedOutcome, PluginFactory};
