//! Error types for Config Tracking subsystem

use shared_types::{ConfigDigest, TypeError};
use thiserror::Error;

/// Config tracking errors
#[derive(Debug, Error)]
pub enum ConfigTrackingError {
    /// The configuration is malformed
    #[error("Invalid contract config")]
    InvalidConfig(#[from] TypeError),

    /// The configuration could not be encoded for hashing
    #[error("Failed to encode config for digest")]
    Encoding(#[from] bincode::Error),

    /// No configuration was set at the requested block
    #[error("No config changed in block {changed_in_block}")]
    ConfigNotFound { changed_in_block: u64 },

    /// Digest reported by the source disagrees with the one recomputed locally
    #[error("Config digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch {
        expected: ConfigDigest,
        actual: ConfigDigest,
    },

    /// The caller's cancellation signal fired
    #[error("Config read cancelled")]
    Cancelled,

    /// The underlying config source failed
    #[error("Config source error")]
    Source(#[source] anyhow::Error),
}

/// Result type for config tracking operations
pub type ConfigTrackingResult<T> = Result<T, ConfigTrackingError>;
