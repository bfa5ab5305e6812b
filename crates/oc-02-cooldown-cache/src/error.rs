//! Error types for the cooldown cache

use std::time::Duration;
use thiserror::Error;

/// Cooldown cache errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The lock could not be acquired before the caller's deadline
    #[error("Cooldown cache {operation} exceeded deadline of {timeout:?}")]
    DeadlineExceeded {
        operation: &'static str,
        timeout: Duration,
    },
}

/// Result type for deadline-aware cache operations
pub type CacheResult<T> = Result<T, CacheError>;
