//! # oc-04-round-executor
//!
//! Leader-driven reporting round state machine.
//!
//! ## Round Flow
//!
//! ```text
//! LeaderSelect → Query → Observe → Validate → Outcome → GenerateReports
//!                                                │              │
//!                                  previous_outcome updated     ↓
//!                                                        AcceptDecision → TransmitDecision → transmitter
//! ```
//!
//! Any phase error aborts the round: no report reaches any bucket, and the
//! next round runs under `seq_nr + 1`. An outcome computed before the abort
//! still becomes the next round's previous outcome.
//!
//! ## Guarantees
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | Round monotonicity | `seq_nr` advanced before any phase runs |
//! | Abort purity | `RoundResult::abort` clears every bucket |
//! | Outcome carry-forward | previous outcome replaced right after Outcome succeeds |
//! | Prompt cancellation | every phase races the caller's token and its deadline |
//! | Leader agreement | pure `LeaderSelector` over `(config_digest, seq_nr)` |
//!
//! ## Example
//!
//! ```rust,ignore
//! use oc_04_round_executor::{RoundExecutor, RoundExecutorApi, RoundExecutorConfig};
//!
//! let mut executor = RoundExecutor::new(
//!     RoundExecutorConfig::default(),
//!     members,
//!     f,
//!     config_digest,
//!     transmitter,
//! );
//! let result = executor.run_round(&cancel).await;
//! if let Some(err) = &result.error {
//!     health.add("round-executor", anyhow::anyhow!("{err}"));
//! }
//! ```

pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use domain::{
    KeyedLeaderSelector, LeaderSelector, RoundPhase, RoundResult, RoundRobinLeaderSelector,
    RoundState, ValidationPolicy,
};
pub use error::{ExecutorResult, RoundError};
pub use ports::inbound::RoundExecutorApi;
pub use ports::outbound::{ContractTransmitter, DigestGuard, ReportingPlugin};
pub use service::{Member, RoundExecutor, RoundExecutorConfig};
