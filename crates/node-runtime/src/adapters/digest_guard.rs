//! Digest guard backed by the config tracker

use async_trait::async_trait;
use oc_01_config_tracking::ContractConfigTracker;
use oc_04_round_executor::DigestGuard;
use shared_types::ConfigDigest;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Answers the executor's pre-transmission digest check with the tracker's
/// latest digest.
pub struct TrackerDigestGuard<T: ?Sized> {
    tracker: Arc<T>,
}

impl<T: ContractConfigTracker + ?Sized> TrackerDigestGuard<T> {
    pub fn new(tracker: Arc<T>) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl<T: ContractConfigTracker + ?Sized> DigestGuard for TrackerDigestGuard<T> {
    async fn current_digest(&self, cancel: &CancellationToken) -> anyhow::Result<ConfigDigest> {
        let details = self.tracker.latest_config_details(cancel).await?;
        Ok(details.config_digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oc_01_config_tracking::InMemoryConfigTracker;
    use shared_types::ContractConfig;

    #[tokio::test]
    async fn test_reports_latest_tracker_digest() {
        let tracker = Arc::new(InMemoryConfigTracker::new());
        let guard = TrackerDigestGuard::new(tracker.clone());
        let cancel = CancellationToken::new();

        tracker.set_config(ContractConfig {
            config_digest: ConfigDigest([5; 32]),
            ..Default::default()
        });
        assert_eq!(
            guard.current_digest(&cancel).await.unwrap(),
            ConfigDigest([5; 32])
        );
    }

    #[tokio::test]
    async fn test_tracker_outage_is_an_error() {
        let tracker = Arc::new(InMemoryConfigTracker::new());
        tracker.set_unavailable(true);
        let guard = TrackerDigestGuard::new(tracker);
        assert!(guard.current_digest(&CancellationToken::new()).await.is_err());
    }
}
