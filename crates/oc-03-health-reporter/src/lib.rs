//! # oc-03-health-reporter
//!
//! Collects timestamped errors per named subsystem and reports a rolling
//! window of recent errors, for node operators and health checks.
//!
//! ## Architecture
//!
//! ```text
//! round driver ──add("round-executor", err)──┐
//! config poller ──add("config-tracker", err)─┼──→ HealthReporter ──report()──→ health check
//!                                            │        ▲
//!                                            │        └── prune task (every interval)
//! ```
//!
//! Per-subsystem lists are append-only and time-ordered, so pruning stops at
//! the first entry still inside the lookback window.
//!
//! ## Example
//!
//! ```rust,ignore
//! use oc_03_health_reporter::{HealthReporter, HealthReporterConfig};
//!
//! let reporter = HealthReporter::start(HealthReporterConfig::default())?;
//! reporter.add("round-executor", anyhow::anyhow!("query timed out"));
//! for (subsystem, joined) in reporter.report() {
//!     println!("{subsystem}: {joined}");
//! }
//! reporter.close().await?;
//! ```

pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use domain::{ErrorRecord, JoinedError, SubsystemLog};
pub use error::{HealthError, HealthResult};
pub use ports::inbound::HealthApi;
pub use service::{HealthReporter, HealthReporterConfig};
