//! Driven Ports (SPI - Outbound Dependencies)

use crate::error::ConfigTrackingResult;
use async_trait::async_trait;
use shared_types::{ConfigDigest, ContractConfig};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Cheap metadata about the latest configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigDetails {
    /// Block in which the configuration was set.
    pub changed_in_block: u64,
    /// Digest of that configuration.
    pub config_digest: ConfigDigest,
}

/// Authoritative source of the committee configuration.
///
/// # Notify contract
///
/// `notify()` is an optional fast path. A `Some` receiver fires (content is
/// meaningless, only arrival counts) when the configuration may have changed.
/// The sending half MUST stay alive for the tracker's whole lifetime: a
/// closed channel would mean "config never changes again", which is never
/// true. `None` means no fast path; consumers fall back to polling
/// `latest_config_details`.
#[async_trait]
pub trait ContractConfigTracker: Send + Sync {
    /// Optional change notification channel.
    fn notify(&self) -> Option<watch::Receiver<()>>;

    /// Block and digest of the latest configuration.
    async fn latest_config_details(
        &self,
        cancel: &CancellationToken,
    ) -> ConfigTrackingResult<ConfigDetails>;

    /// Full configuration set in `changed_in_block`.
    async fn latest_config(
        &self,
        cancel: &CancellationToken,
        changed_in_block: u64,
    ) -> ConfigTrackingResult<ContractConfig>;

    /// Current height of the chain holding the configuration.
    async fn latest_block_height(&self, cancel: &CancellationToken) -> ConfigTrackingResult<u64>;
}
