//! Error types for the health reporter

use std::time::Duration;
use thiserror::Error;

/// Health reporter errors
#[derive(Debug, Error)]
pub enum HealthError {
    /// Lookback and prune interval must be non-zero
    #[error("Invalid health reporter config: lookback {lookback:?}, prune interval {prune_interval:?}")]
    InvalidConfig {
        lookback: Duration,
        prune_interval: Duration,
    },

    /// The pruning task panicked or was aborted
    #[error("Prune task failed")]
    PruneTask(#[from] tokio::task::JoinError),
}

/// Result type for health reporter operations
pub type HealthResult<T> = Result<T, HealthError>;
