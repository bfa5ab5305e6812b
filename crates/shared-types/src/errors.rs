//! # Error Types
//!
//! Defines error types for constructing shared entities.

use thiserror::Error;

/// Errors raised while building or validating shared entities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// A config digest was built from a slice of the wrong length.
    #[error("Invalid config digest length: expected 32 bytes, got {actual}")]
    InvalidDigestLength { actual: usize },

    /// A committee has no members.
    #[error("Committee is empty")]
    EmptyCommittee,

    /// The committee is too small to tolerate `f` faults (3f+1 <= n violated).
    #[error("Fault threshold too high: n={n} cannot tolerate f={f} (need n >= 3f+1)")]
    FaultThresholdTooHigh { n: usize, f: u8 },

    /// Signer and transmitter lists disagree in length.
    #[error("Signer/transmitter count mismatch: {signers} signers, {transmitters} transmitters")]
    SignerTransmitterMismatch { signers: usize, transmitters: usize },

    /// More members than an `OracleId` can address.
    #[error("Committee too large: {n} members, max {max}")]
    CommitteeTooLarge { n: usize, max: usize },

    /// Two members share an oracle id.
    #[error("Duplicate oracle id {0} in committee")]
    DuplicateOracle(u8),
}
