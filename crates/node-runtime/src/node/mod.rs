//! Oracle node driver loop
//!
//! Keeps the round executor on the tracker's current configuration and runs
//! one round per tick. Round failures never stop the loop: they are recorded
//! in the health reporter and the next round runs under the next sequence
//! number.

use crate::adapters::{CooldownTransmitter, TrackerDigestGuard};
use crate::container::NodeConfig;
use crate::error::{NodeError, NodeResult};
use crate::ports::{OutcomeStore, PersistedOutcome, PluginFactory};
use chrono::{Duration as ChronoDuration, Utc};
use oc_01_config_tracking::{ConfigDetails, ConfigTrackingError, ContractConfigTracker};
use oc_02_cooldown_cache::CooldownCache;
use oc_03_health_reporter::{HealthApi, HealthReporter, JoinedError};
use oc_04_round_executor::{
    ContractTransmitter, ReportingPlugin, RoundExecutor, RoundExecutorApi,
};
use oracle_telemetry::{
    log_round_event, time_histogram, CONFIG_CHANGES, LAST_SEQ_NR, NODE_ROUNDS, ROUND_DURATION,
    SUBSYSTEM_ERRORS,
};
use shared_types::{Committee, ConfigDigest, OracleId, SeqNr};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};


/// Health reporter subsystem names used by the node.
pub mod subsystem {
    pub const ROUND_EXECUTOR: &str = "round-executor";
    pub const CONFIG_SYNC: &str = "config-sync";
    pub const TRANSMITTER: &str = "transmitter";
    pub const OUTCOME_STORE: &str = "outcome-store";
}

/// Report metadata type produced by a factory's plugins.
pub type ReportInfoOf<F> = <<F as PluginFactory>::Plugin as ReportingPlugin>::ReportInfo;

/// Counters over the lifetime of one `run`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStats {
    pub rounds_run: u64,
    pub rounds_succeeded: u64,
    pub rounds_aborted: u64,
    /// Reports the transmitter accepted
    pub reports_transmitted: u64,
    /// Reports withheld because an identical one was sent within the cooldown
    pub reports_suppressed: u64,
    pub config_changes: u64,
}

/// One oracle node: tracker, executor, health reporter, cooldown cache and
/// outcome store wired into a single driver loop.
pub struct OracleNode<F: PluginFactory, T: ?Sized> {
    config: NodeConfig,
    tracker: Arc<T>,
    factory: F,
    executor: RoundExecutor<F::Plugin>,
    transmitter: Arc<CooldownTransmitter<ReportInfoOf<F>>>,
    health: Arc<HealthReporter>,
    cooldowns: Arc<CooldownCache>,
    outcome_store: Arc<dyn OutcomeStore>,
    active: Option<ConfigDetails>,
    /// Sequence number that produced the executor's previous outcome
    outcome_seq_nr: SeqNr,
    refresh_pending: bool,
    stats: NodeStats,
}

impl<F, T> OracleNode<F, T>
where
    F: PluginFactory,
    T: ContractConfigTracker + ?Sized + 'static,
{
    /// Wire a node. No configuration is read until `run`.
    ///
    /// `transmitter` is wrapped so that identical reports are not resubmitted
    /// within `config.transmit_cooldown`.
    pub fn new(
        config: NodeConfig,
        tracker: Arc<T>,
        factory: F,
        transmitter: Arc<dyn ContractTransmitter<ReportInfoOf<F>>>,
        outcome_store: Arc<dyn OutcomeStore>,
        health: Arc<HealthReporter>,
    ) -> NodeResult<Self> {
        config.validate()?;
        let cooldown = ChronoDuration::from_std(config.transmit_cooldown).map_err(|_| {
            NodeError::InvalidConfig(format!(
                "transmit cooldown {:?} out of range",
                config.transmit_cooldown
            ))
        })?;

        let cooldowns = Arc::new(CooldownCache::new());
        let transmitter = Arc::new(CooldownTransmitter::new(
            transmitter,
            cooldowns.clone(),
            cooldown,
        ));
        let executor = RoundExecutor::new(
            config.executor.clone(),
            Vec::new(),
            0,
            ConfigDigest::default(),
            transmitter.clone(),
        )
        .with_digest_guard(Arc::new(TrackerDigestGuard::new(tracker.clone())));

        Ok(Self {
            config,
            tracker,
            factory,
            executor,
            transmitter,
            health,
            cooldowns,
            outcome_store,
            active: None,
            outcome_seq_nr: 0,
            refresh_pending: true,
            stats: NodeStats::default(),
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn executor(&self) -> &RoundExecutor<F::Plugin> {
        &self.executor
    }

    pub fn health(&self) -> &Arc<HealthReporter> {
        &self.health
    }

    pub fn cooldowns(&self) -> &Arc<CooldownCache> {
        &self.cooldowns
    }

    /// Configuration the executor currently runs under.
    pub fn active_config(&self) -> Option<ConfigDetails> {
        self.active
    }

    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }

    /// Recent errors per subsystem.
    pub fn health_report(&self) -> HashMap<String, JoinedError> {
        self.health.report()
    }

    /// Drive rounds until `cancel` fires or `max_rounds` rounds have run.
    pub async fn run(&mut self, cancel: &CancellationToken) -> NodeResult<NodeStats> {
        let mut notify = self.tracker.notify();
        info!(
            node_id = self.config.node_id,
            round_interval = ?self.config.round_interval,
            notify = notify.is_some(),
            "oracle node starting"
        );
        if notify.is_none() {
            info!(
                poll_interval = ?self.config.config_poll_interval,
                "no config notify channel, polling"
            );
        }

        self.refresh_pending = true;
        let mut round_ticker = tokio::time::interval(self.config.round_interval);
        round_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut poll_ticker = tokio::time::interval(self.config.config_poll_interval);
        poll_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("cancellation received, stopping round loop");
                    break;
                }
                open = config_changed(&mut notify) => {
                    if open {
                        debug!("config change notified");
                        self.refresh_pending = true;
                    } else {
                        warn!("config notify channel closed, falling back to polling");
                        notify = None;
                    }
                }
                _ = poll_ticker.tick(), if notify.is_none() => {
                    self.refresh_pending = true;
                }
                _ = round_ticker.tick() => {
                    self.tick(cancel).await;
                    if self
                        .config
                        .max_rounds
                        .is_some_and(|max| self.stats.rounds_run >= max)
                    {
                        info!(rounds = self.stats.rounds_run, "round limit reached");
                        break;
                    }
                }
            }
        }

        self.log_health();
        Ok(self.stats.clone())
    }

    async fn tick(&mut self, cancel: &CancellationToken) {
        self.cooldowns.prune_expired(Utc::now());

        if self.refresh_pending {
            match self.sync_config(cancel).await {
                Ok(_) => self.refresh_pending = false,
                Err(NodeError::ConfigTracking(ConfigTrackingError::Cancelled)) => return,
                Err(err) => {
                    warn!(
                        error = &err as &dyn std::error::Error,
                        "config refresh failed, round skipped"
                    );
                    self.record_error(subsystem::CONFIG_SYNC, anyhow::Error::new(err));
                    return;
                }
            }
        }

        if self.active.is_none() {
            trace!("no active configuration, round skipped");
            return;
        }
        self.run_one_round(cancel).await;
    }

    /// Adopt the tracker's latest configuration if its digest differs from the
    /// active one. Returns whether the executor was reconfigured.
    async fn sync_config(&mut self, cancel: &CancellationToken) -> NodeResult<bool> {
        let details = self.tracker.latest_config_details(cancel).await?;
        if details.config_digest.is_zero() {
            debug!("no configuration published yet");
            return Ok(false);
        }
        if self
            .active
            .is_some_and(|active| active.config_digest == details.config_digest)
        {
            trace!(config_digest = %details.config_digest.short(), "configuration unchanged");
            return Ok(false);
        }

        let config = self
            .tracker
            .latest_config(cancel, details.changed_in_block)
            .await?;
        if config.config_digest != details.config_digest {
            return Err(ConfigTrackingError::DigestMismatch {
                expected: details.config_digest,
                actual: config.config_digest,
            }
            .into());
        }

        let committee = Committee::from_contract_config(&config)?;
        let me = OracleId(self.config.node_id);
        if !committee.contains(me) {
            return Err(NodeError::NotAMember(me));
        }

        let members = committee
            .members()
            .iter()
            .map(|member| {
                self.factory
                    .new_plugin(member, &config)
                    .map(|plugin| (member.id, plugin))
                    .map_err(|source| NodeError::Plugin {
                        oracle: member.id,
                        source,
                    })
            })
            .collect::<NodeResult<Vec<_>>>()?;

        let digest = details.config_digest;
        let persisted = self
            .outcome_store
            .load(&digest)
            .await
            .map_err(NodeError::OutcomeStore)?;
        match persisted {
            Some(record) => {
                self.outcome_seq_nr = record.seq_nr;
                self.executor.resume(
                    members,
                    committee.f(),
                    digest,
                    record.next_seq_nr(),
                    record.outcome,
                );
            }
            None => {
                self.outcome_seq_nr = 0;
                self.executor.reconfigure(members, committee.f(), digest);
            }
        }

        self.active = Some(details);
        self.stats.config_changes += 1;
        CONFIG_CHANGES.inc();
        info!(
            changed_in_block = details.changed_in_block,
            config_digest = %digest.short(),
            n = committee.n(),
            f = committee.f(),
            next_seq_nr = self.executor.next_seq_nr(),
            "configuration adopted"
        );
        Ok(true)
    }

    async fn run_one_round(&mut self, cancel: &CancellationToken) {
        let submitted = self.transmitter.submitted();
        let suppressed = self.transmitter.suppressed();
        let mut result = {
            let _timer = time_histogram!(ROUND_DURATION);
            self.executor.run_round(cancel).await
        };
        self.stats.rounds_run += 1;
        self.stats.reports_transmitted += self.transmitter.submitted() - submitted;
        self.stats.reports_suppressed += self.transmitter.suppressed() - suppressed;
        LAST_SEQ_NR.set(result.seq_nr as f64);

        // Every attempt consumes its sequence number, so the high-water mark
        // is persisted even when the round aborted before Outcome.
        if result.outcome_updated {
            self.outcome_seq_nr = result.seq_nr;
        }
        let record = PersistedOutcome {
            config_digest: result.config_digest,
            seq_nr: self.outcome_seq_nr,
            last_attempted_seq_nr: result.seq_nr,
            outcome: self.executor.previous_outcome().to_vec(),
        };
        if let Err(err) = self.outcome_store.store(record).await {
            warn!(seq_nr = result.seq_nr, %err, "failed to persist round state");
            self.record_error(subsystem::OUTCOME_STORE, err);
        }

        for err in result.transmit_errors.drain(..) {
            self.record_error(subsystem::TRANSMITTER, err);
        }

        match result.error.take() {
            None => {
                self.stats.rounds_succeeded += 1;
                NODE_ROUNDS.with_label_values(&["success"]).inc();
            }
            Some(err) => {
                self.stats.rounds_aborted += 1;
                NODE_ROUNDS.with_label_values(&["aborted"]).inc();
                if err.requires_config_refresh() {
                    self.refresh_pending = true;
                }
                if err.is_cancelled() {
                    debug!(seq_nr = result.seq_nr, "round cancelled");
                } else {
                    log_round_event!(
                        warn,
                        subsystem::ROUND_EXECUTOR,
                        "round aborted, recorded in health report",
                        result.seq_nr,
                        result.config_digest.short(),
                        kind = err.kind()
                    );
                    self.record_error(subsystem::ROUND_EXECUTOR, anyhow::Error::new(err));
                }
            }
        }
    }

    fn record_error(&self, subsystem: &str, err: anyhow::Error) {
        SUBSYSTEM_ERRORS.with_label_values(&[subsystem]).inc();
        self.health.add(subsystem, err);
    }

    fn log_health(&self) {
        for (subsystem, joined) in self.health.report() {
            warn!(
                subsystem = %subsystem,
                errors = joined.len(),
                "recent errors:\n{}",
                joined
            );
        }
    }
}

/// Resolves when the notify channel fires (`true`) or closes (`false`).
/// Never resolves without a channel.
async fn config_changed(notify: &mut Option<watch::Receiver<()>>) -> bool {
    match notify {
        Some(rx) => rx.changed().await.is_ok(),
        None => std::future::pending().await,
    }
}
