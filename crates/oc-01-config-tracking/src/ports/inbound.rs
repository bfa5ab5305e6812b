//! Driving Ports (API - Inbound)

use crate::error::ConfigTrackingResult;
use shared_types::{ConfigDigest, ConfigDigestPrefix, ContractConfig};

/// Derives the digest of a committee configuration.
///
/// Implementations are pure: the same config always yields the same digest,
/// and the first two bytes of every digest equal `config_digest_prefix()`.
pub trait ConfigDigester: Send + Sync {
    /// Compute the digest of `config`. The `config_digest` field of the input
    /// is ignored.
    fn config_digest(&self, config: &ContractConfig) -> ConfigTrackingResult<ConfigDigest>;

    /// Protocol-family prefix, constant for the lifetime of the digester.
    fn config_digest_prefix(&self) -> ConfigDigestPrefix;
}
