//! Domain module for the health reporter
//!
//! - joined: ordered aggregate of errors that stays downcastable
//! - log: time-ordered per-subsystem error list with early-stop pruning

pub mod joined;
pub mod log;

pub use joined::JoinedError;
pub use log::{ErrorRecord, SubsystemLog};
