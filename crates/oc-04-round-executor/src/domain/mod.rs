//! Domain module for the Round Executor
//!
//! ## Core Modules
//! - phase: round phase state machine
//! - leader: deterministic leader selection
//! - policy: observation validation policy
//! - result: per-round result record

pub mod leader;
pub mod phase;
pub mod policy;
pub mod result;

pub use leader::{KeyedLeaderSelector, LeaderSelector, RoundRobinLeaderSelector};
pub use phase::{RoundPhase, RoundState};
pub use policy::ValidationPolicy;
pub use result::RoundResult;
