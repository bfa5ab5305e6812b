//! Health reporter service

use crate::domain::{JoinedError, SubsystemLog};
use crate::error::{HealthError, HealthResult};
use crate::metrics;
use crate::ports::inbound::HealthApi;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Health reporter configuration
#[derive(Clone, Debug)]
pub struct HealthReporterConfig {
    /// How long an error stays visible in `report()`
    pub lookback: Duration,
    /// How often the background task prunes every subsystem
    pub prune_interval: Duration,
}

impl HealthReporterConfig {
    /// Lookback with a prune interval of the same length.
    pub fn new(lookback: Duration) -> Self {
        Self {
            lookback,
            prune_interval: lookback,
        }
    }

    fn validate(&self) -> HealthResult<()> {
        if self.lookback.is_zero() || self.prune_interval.is_zero() {
            return Err(HealthError::InvalidConfig {
                lookback: self.lookback,
                prune_interval: self.prune_interval,
            });
        }
        Ok(())
    }
}

impl Default for HealthReporterConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

struct ReporterState {
    logs: HashMap<String, SubsystemLog>,
    closed: bool,
}

struct Shared {
    lookback: Duration,
    state: Mutex<ReporterState>,
}

impl Shared {
    fn prune_all(&self, now: Instant) -> usize {
        let mut state = self.state.lock();
        if state.closed {
            return 0;
        }
        let removed = state
            .logs
            .values_mut()
            .map(|log| log.prune(now, self.lookback))
            .sum();
        state.logs.retain(|_, log| !log.is_empty());
        removed
    }
}

/// Rolling per-subsystem error window.
///
/// Constructed once at process start and shared by reference with every
/// subsystem that reports errors.
pub struct HealthReporter {
    shared: Arc<Shared>,
    cancel: CancellationToken,
    prune_task: Mutex<Option<JoinHandle<()>>>,
}

impl HealthReporter {
    /// Spawn the pruning task and return the running reporter.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: HealthReporterConfig) -> HealthResult<Self> {
        config.validate()?;

        let shared = Arc::new(Shared {
            lookback: config.lookback,
            state: Mutex::new(ReporterState {
                logs: HashMap::new(),
                closed: false,
            }),
        });
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(prune_task(
            shared.clone(),
            config.prune_interval,
            cancel.clone(),
        ));

        info!(
            lookback = ?config.lookback,
            prune_interval = ?config.prune_interval,
            "[oc-03] health reporter started"
        );

        Ok(Self {
            shared,
            cancel,
            prune_task: Mutex::new(Some(handle)),
        })
    }

    /// Subsystems that currently hold at least one record.
    pub fn subsystems(&self) -> Vec<String> {
        let mut names: Vec<String> = self.shared.state.lock().logs.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of records held for `subsystem`, expired ones included until
    /// the next prune.
    pub fn len(&self, subsystem: &str) -> usize {
        self.shared
            .state
            .lock()
            .logs
            .get(subsystem)
            .map_or(0, SubsystemLog::len)
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }
}

#[async_trait]
impl HealthApi for HealthReporter {
    fn add(&self, subsystem: &str, error: anyhow::Error) {
        let mut state = self.shared.state.lock();
        if state.closed {
            drop(state);
            metrics::record_dropped();
            warn!(subsystem, %error, "[oc-03] health reporter closed, dropping error");
            return;
        }
        debug!(subsystem, %error, "[oc-03] error recorded");
        state
            .logs
            .entry(subsystem.to_string())
            .or_default()
            .push(Instant::now(), Arc::new(error));
        drop(state);
        metrics::record_added(subsystem);
    }

    fn report(&self) -> HashMap<String, JoinedError> {
        let now = Instant::now();
        let removed = self.shared.prune_all(now);
        if removed > 0 {
            metrics::record_pruned(removed);
        }

        // After close the logs are frozen, so expired records are filtered
        // from the view instead of pruned.
        let state = self.shared.state.lock();
        state
            .logs
            .iter()
            .filter_map(|(name, log)| {
                let recent = log.recent(now, self.shared.lookback);
                (!recent.is_empty()).then(|| (name.clone(), recent))
            })
            .collect()
    }

    async fn close(&self) -> HealthResult<()> {
        self.shared.state.lock().closed = true;
        self.cancel.cancel();

        let handle = self.prune_task.lock().take();
        match handle {
            Some(handle) => {
                handle.await?;
                info!("[oc-03] health reporter closed");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for HealthReporter {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Background task that prunes every subsystem each interval until cancelled.
async fn prune_task(shared: Arc<Shared>, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let removed = shared.prune_all(Instant::now());
                if removed > 0 {
                    metrics::record_pruned(removed);
                    debug!(removed, "[oc-03] pruned expired errors");
                }
            }
        }
    }
    debug!("[oc-03] prune task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    enum SysError {
        #[error("error A")]
        A,
        #[error("error B")]
        B,
        #[error("error C")]
        C,
    }

    fn reporter(lookback_secs: u64) -> HealthReporter {
        HealthReporter::start(HealthReporterConfig::new(Duration::from_secs(lookback_secs)))
            .unwrap()
    }

    #[tokio::test]
    async fn test_merge_scenario() {
        let reporter = reporter(60);

        reporter.add("sys", SysError::A.into());
        let report = reporter.report();
        assert!(report["sys"].is(&SysError::A));

        reporter.add("sys", SysError::B.into());
        reporter.add("sys", SysError::C.into());
        let report = reporter.report();
        let joined = &report["sys"];
        assert!(joined.is(&SysError::A));
        assert!(joined.is(&SysError::B));
        assert!(joined.is(&SysError::C));
        assert_eq!(joined.to_string(), "error A\nerror B\nerror C");

        reporter.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_subsystems_are_independent() {
        let reporter = reporter(60);
        reporter.add("round-executor", SysError::A.into());
        reporter.add("config-tracker", SysError::B.into());

        let report = reporter.report();
        assert_eq!(report.len(), 2);
        assert!(!report["round-executor"].is(&SysError::B));
        assert_eq!(reporter.subsystems(), vec!["config-tracker", "round-executor"]);

        reporter.close().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_prunes_expired_entries() {
        let reporter = reporter(1);
        reporter.add("sys", SysError::A.into());

        tokio::time::advance(Duration::from_secs(2)).await;
        let report = reporter.report();
        assert!(!report.contains_key("sys"));

        reporter.close().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_task_prunes_without_report() {
        let reporter = reporter(1);
        reporter.add("sys", SysError::A.into());
        assert_eq!(reporter.len("sys"), 1);

        tokio::time::advance(Duration::from_millis(2500)).await;
        // Let the prune task observe its tick
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(reporter.len("sys"), 0);
        assert!(reporter.subsystems().is_empty());

        reporter.close().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_recent_entries_survive_prune() {
        let reporter = reporter(5);
        reporter.add("sys", SysError::A.into());
        tokio::time::advance(Duration::from_secs(4)).await;
        reporter.add("sys", SysError::B.into());
        tokio::time::advance(Duration::from_secs(2)).await;

        let report = reporter.report();
        let joined = &report["sys"];
        assert!(!joined.is(&SysError::A));
        assert!(joined.is(&SysError::B));
        assert_eq!(joined.len(), 1);

        reporter.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_stops_mutation() {
        let reporter = reporter(60);
        reporter.add("sys", SysError::A.into());

        reporter.close().await.unwrap();
        reporter.close().await.unwrap();
        assert!(reporter.is_closed());

        reporter.add("sys", SysError::B.into());
        assert_eq!(reporter.len("sys"), 1);
        assert!(!reporter.report()["sys"].is(&SysError::B));
    }

    #[tokio::test]
    async fn test_zero_lookback_rejected() {
        let result = HealthReporter::start(HealthReporterConfig::new(Duration::ZERO));
        assert!(matches!(result, Err(HealthError::InvalidConfig { .. })));
    }
}
