//! # Adapter Implementations
//!
//! Concrete implementations of the ports the driver loop depends on:
//!
//! ```text
//! OracleNode ──→ OutcomeStore        (InMemoryOutcomeStore)
//!     │
//!     └──→ RoundExecutor ──→ DigestGuard         (TrackerDigestGuard)
//!                    │
//!                    ├──→ ContractTransmitter ──→ CooldownTransmitter ──→ LoggingTransmitter
//!                    │
//!                    └──→ ReportingPlugin     (CounterPlugin, local demo)
//! ```

pub mod counter_plugin;
pub mod digest_guard;
pub mod outcome_store;
pub mod transmitter;

pub use counter_plugin::{CounterPlugin, CounterPluginFactory, CounterReportInfo};
pub use digest_guard::TrackerDigestGuard;
pub use outcome_store::InMemoryOutcomeStore;
pub use transmitter::{CooldownTransmitter, LoggingTransmitter};
