//! Error types for the Round Executor
//!
//! Every abort is tagged with the phase that produced it. Plugin failures keep
//! their `anyhow` source chain. Messages never repeat the source, so
//! chain-printing reporters show each cause once.

use crate::domain::phase::RoundPhase;
use shared_types::{ConfigDigest, OracleId};
use std::time::Duration;
use thiserror::Error;

/// Round abort reasons
#[derive(Debug, Error)]
pub enum RoundError {
    /// No member to lead the round
    #[error("Cannot select a leader from an empty committee")]
    EmptyCommittee,

    /// Every sequence number of this configuration has been used
    #[error("Sequence numbers exhausted under config {config_digest}")]
    SeqNrExhausted { config_digest: ConfigDigest },

    /// The leader selector picked an index outside the committee
    #[error("Leader selector chose index {index} in a committee of {n}")]
    InvalidLeader { index: usize, n: usize },

    #[error("Query failed")]
    Query(#[source] anyhow::Error),

    #[error("Observation from {observer} failed")]
    Observation {
        observer: OracleId,
        #[source]
        source: anyhow::Error,
    },

    #[error("Observation from {observer} failed validation")]
    ValidateObservation {
        observer: OracleId,
        #[source]
        source: anyhow::Error,
    },

    /// Too few observations survived validation
    #[error("Only {valid} valid observations, {required} required")]
    InsufficientObservations { valid: usize, required: usize },

    #[error("Outcome failed")]
    Outcome(#[source] anyhow::Error),

    #[error("Reports failed")]
    Reports(#[source] anyhow::Error),

    #[error("ShouldAcceptAttestedReport on {member} failed")]
    ShouldAcceptAttestedReport {
        member: OracleId,
        #[source]
        source: anyhow::Error,
    },

    #[error("ShouldTransmitAcceptedReport on {member} failed")]
    ShouldTransmitAcceptedReport {
        member: OracleId,
        #[source]
        source: anyhow::Error,
    },

    /// The caller's cancellation signal fired mid-phase
    #[error("Round cancelled during {phase}")]
    Cancelled { phase: RoundPhase },

    /// A phase call outlived its maximum duration
    #[error("Deadline of {timeout:?} exceeded during {phase}")]
    DeadlineExceeded { phase: RoundPhase, timeout: Duration },

    /// The active configuration changed under the round
    #[error("Config digest mismatch: round started under {expected}, tracker reports {actual}")]
    ConfigMismatch {
        expected: ConfigDigest,
        actual: ConfigDigest,
    },

    /// The active configuration could not be read back
    #[error("Config digest check failed")]
    ConfigCheck(#[source] anyhow::Error),
}

impl RoundError {
    /// The phase this error is attributed to.
    pub fn phase(&self) -> RoundPhase {
        match self {
            RoundError::EmptyCommittee
            | RoundError::InvalidLeader { .. }
            | RoundError::SeqNrExhausted { .. } => {
                RoundPhase::LeaderSelect
            }
            RoundError::Query(_) => RoundPhase::Query,
            RoundError::Observation { .. } => RoundPhase::Observe,
            RoundError::ValidateObservation { .. } | RoundError::InsufficientObservations { .. } => {
                RoundPhase::Validate
            }
            RoundError::Outcome(_) => RoundPhase::Outcome,
            RoundError::Reports(_) => RoundPhase::GenerateReports,
            RoundError::ShouldAcceptAttestedReport { .. } => RoundPhase::AcceptDecision,
            RoundError::ShouldTransmitAcceptedReport { .. }
            | RoundError::ConfigMismatch { .. }
            | RoundError::ConfigCheck(_) => RoundPhase::TransmitDecision,
            RoundError::Cancelled { phase } | RoundError::DeadlineExceeded { phase, .. } => *phase,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RoundError::Cancelled { .. })
    }

    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, RoundError::DeadlineExceeded { .. })
    }

    /// True when the caller should re-read the configuration before the next
    /// round.
    pub fn requires_config_refresh(&self) -> bool {
        matches!(
            self,
            RoundError::ConfigMismatch { .. } | RoundError::ConfigCheck(_)
        )
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RoundError::Cancelled { .. } => "cancelled",
            RoundError::DeadlineExceeded { .. } => "deadline_exceeded",
            RoundError::ConfigMismatch { .. } | RoundError::ConfigCheck(_) => "config_mismatch",
            RoundError::SeqNrExhausted { .. } => "seq_nr_exhausted",
            _ => self.phase().as_str(),
        }
    }
}

/// Result type for round executor operations
pub type ExecutorResult<T> = Result<T, RoundError>;
