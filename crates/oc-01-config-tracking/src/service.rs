//! Digest-transforming config tracker
//!
//! Wraps the authoritative tracker and runs every digest it returns through the
//! same prefix-preserving transform, so `latest_config_details` and
//! `latest_config` always agree on the digest of one configuration.

use crate::domain::transform::{transform_preserving_prefix, DigestTransform};
use crate::error::{ConfigTrackingError, ConfigTrackingResult};
use crate::ports::outbound::{ConfigDetails, ContractConfigTracker};
use async_trait::async_trait;
use shared_types::ContractConfig;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Config tracker that rewrites digests with a per-instance transform.
pub struct DigestTransformingTracker<T: ?Sized, X> {
    base: Arc<T>,
    transform: X,
}

impl<T: ContractConfigTracker + ?Sized, X: DigestTransform> DigestTransformingTracker<T, X> {
    pub fn new(base: Arc<T>, transform: X) -> Self {
        Self { base, transform }
    }

    pub fn base(&self) -> &Arc<T> {
        &self.base
    }
}

/// Race a base call against the caller's cancellation signal.
async fn cancellable<F, R>(cancel: &CancellationToken, fut: F) -> ConfigTrackingResult<R>
where
    F: Future<Output = ConfigTrackingResult<R>>,
{
    if cancel.is_cancelled() {
        return Err(ConfigTrackingError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ConfigTrackingError::Cancelled),
        result = fut => result,
    }
}

#[async_trait]
impl<T, X> ContractConfigTracker for DigestTransformingTracker<T, X>
where
    T: ContractConfigTracker + ?Sized,
    X: DigestTransform,
{
    fn notify(&self) -> Option<watch::Receiver<()>> {
        self.base.notify()
    }

    async fn latest_config_details(
        &self,
        cancel: &CancellationToken,
    ) -> ConfigTrackingResult<ConfigDetails> {
        let mut details = cancellable(cancel, self.base.latest_config_details(cancel)).await?;
        let base_digest = details.config_digest;
        details.config_digest = transform_preserving_prefix(&self.transform, base_digest);

        trace!(
            changed_in_block = details.changed_in_block,
            base = %base_digest.short(),
            transformed = %details.config_digest.short(),
            "[oc-01] latest config details"
        );
        Ok(details)
    }

    async fn latest_config(
        &self,
        cancel: &CancellationToken,
        changed_in_block: u64,
    ) -> ConfigTrackingResult<ContractConfig> {
        let mut config =
            cancellable(cancel, self.base.latest_config(cancel, changed_in_block)).await?;
        config.config_digest = transform_preserving_prefix(&self.transform, config.config_digest);

        debug!(
            changed_in_block,
            config_count = config.config_count,
            digest = %config.config_digest.short(),
            "[oc-01] loaded latest config"
        );
        Ok(config)
    }

    async fn latest_block_height(&self, cancel: &CancellationToken) -> ConfigTrackingResult<u64> {
        cancellable(cancel, self.base.latest_block_height(cancel)).await
    }
}
