//! In-memory config source
//!
//! Stands in for the config contract in local runs and tests. Every
//! `set_config` lands in a new block and wakes notify subscribers.

use crate::error::{ConfigTrackingError, ConfigTrackingResult};
use crate::ports::outbound::{ConfigDetails, ContractConfigTracker};
use anyhow::anyhow;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{ConfigDigest, ContractConfig};
use std::collections::BTreeMap;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;

struct TrackerState {
    block_height: u64,
    /// Configurations keyed by the block they were set in.
    history: BTreeMap<u64, ContractConfig>,
    unavailable: bool,
}

/// Config tracker backed by process memory.
///
/// The notify sender lives as long as the tracker, so subscribers never see a
/// closed channel while it exists.
pub struct InMemoryConfigTracker {
    state: RwLock<TrackerState>,
    notify_tx: watch::Sender<()>,
}

impl InMemoryConfigTracker {
    pub fn new() -> Self {
        let (notify_tx, _) = watch::channel(());
        Self {
            state: RwLock::new(TrackerState {
                block_height: 0,
                history: BTreeMap::new(),
                unavailable: false,
            }),
            notify_tx,
        }
    }

    /// Start with `config` already set in block 1.
    pub fn with_config(config: ContractConfig) -> Self {
        let tracker = Self::new();
        tracker.set_config(config);
        tracker
    }

    /// Publish a new configuration in the next block and notify subscribers.
    ///
    /// Returns the block the configuration was set in.
    pub fn set_config(&self, config: ContractConfig) -> u64 {
        let block = {
            let mut state = self.state.write();
            state.block_height += 1;
            let block = state.block_height;
            info!(
                block,
                config_count = config.config_count,
                digest = %config.config_digest.short(),
                "[oc-01] config set"
            );
            state.history.insert(block, config);
            block
        };
        self.notify_tx.send_replace(());
        block
    }

    /// Mine `n` empty blocks.
    pub fn advance_blocks(&self, n: u64) {
        self.state.write().block_height += n;
    }

    /// Make every read fail until switched back, simulating an RPC outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unavailable = unavailable;
    }

    fn check_available(&self) -> ConfigTrackingResult<()> {
        if self.state.read().unavailable {
            return Err(ConfigTrackingError::Source(anyhow!(
                "config source unavailable"
            )));
        }
        Ok(())
    }
}

impl Default for InMemoryConfigTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContractConfigTracker for InMemoryConfigTracker {
    fn notify(&self) -> Option<watch::Receiver<()>> {
        Some(self.notify_tx.subscribe())
    }

    /// Block 0 with the zero digest means no configuration has been set.
    async fn latest_config_details(
        &self,
        cancel: &CancellationToken,
    ) -> ConfigTrackingResult<ConfigDetails> {
        if cancel.is_cancelled() {
            return Err(ConfigTrackingError::Cancelled);
        }
        self.check_available()?;
        let state = self.state.read();
        Ok(match state.history.iter().next_back() {
            Some((block, config)) => ConfigDetails {
                changed_in_block: *block,
                config_digest: config.config_digest,
            },
            None => ConfigDetails {
                changed_in_block: 0,
                config_digest: ConfigDigest::default(),
            },
        })
    }

    async fn latest_config(
        &self,
        cancel: &CancellationToken,
        changed_in_block: u64,
    ) -> ConfigTrackingResult<ContractConfig> {
        if cancel.is_cancelled() {
            return Err(ConfigTrackingError::Cancelled);
        }
        self.check_available()?;
        self.state
            .read()
            .history
            .get(&changed_in_block)
            .cloned()
            .ok_or(ConfigTrackingError::ConfigNotFound { changed_in_block })
    }

    async fn latest_block_height(&self, cancel: &CancellationToken) -> ConfigTrackingResult<u64> {
        if cancel.is_cancelled() {
            return Err(ConfigTrackingError::Cancelled);
        }
        self.check_available()?;
        Ok(self.state.read().block_height)
    }
}
