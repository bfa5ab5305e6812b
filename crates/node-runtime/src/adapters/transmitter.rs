//! Contract transmitter adapters
//!
//! `LoggingTransmitter` stands in for chain submission in local runs.
//! `CooldownTransmitter` wraps any transmitter and drops reports whose
//! fingerprint was sent within the cooldown window.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use oc_02_cooldown_cache::CooldownCache;
use oc_04_round_executor::ContractTransmitter;
use shared_types::{keccak256, Hash, ReportContext, ReportWithInfo};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Logs every report it is handed and counts them.
#[derive(Default)]
pub struct LoggingTransmitter {
    transmitted: AtomicU64,
}

impl LoggingTransmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transmitted(&self) -> u64 {
        self.transmitted.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<I> ContractTransmitter<I> for LoggingTransmitter
where
    I: fmt::Debug + Send + Sync,
{
    async fn transmit(
        &self,
        _cancel: &CancellationToken,
        ctx: ReportContext,
        report: &ReportWithInfo<I>,
    ) -> anyhow::Result<()> {
        self.transmitted.fetch_add(1, Ordering::Relaxed);
        info!(
            seq_nr = ctx.seq_nr,
            epoch = ctx.epoch,
            round = ctx.round,
            config_digest = %ctx.config_digest.short(),
            report = %hex::encode(&report.report),
            info = ?report.info,
            "report transmitted"
        );
        Ok(())
    }
}

/// Fingerprint used as the cooldown key of a report.
pub fn report_fingerprint(report: &[u8]) -> Hash {
    keccak256(&[report])
}

/// Suppresses re-submission of an identical report until its cooldown ends.
///
/// The cooldown starts only after the inner transmitter succeeds, so a
/// failed submission can be retried by the next round. Suppressed reports
/// are counted, not forwarded.
pub struct CooldownTransmitter<I> {
    inner: Arc<dyn ContractTransmitter<I>>,
    cooldowns: Arc<CooldownCache>,
    cooldown: ChronoDuration,
    submitted: AtomicU64,
    suppressed: AtomicU64,
}

impl<I: Send + Sync + 'static> CooldownTransmitter<I> {
    pub fn new(
        inner: Arc<dyn ContractTransmitter<I>>,
        cooldowns: Arc<CooldownCache>,
        cooldown: ChronoDuration,
    ) -> Self {
        Self {
            inner,
            cooldowns,
            cooldown,
            submitted: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
        }
    }

    /// Reports the inner transmitter accepted.
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    /// Reports dropped because they were still cooling down.
    pub fn suppressed(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<I: Send + Sync + 'static> ContractTransmitter<I> for CooldownTransmitter<I> {
    async fn transmit(
        &self,
        cancel: &CancellationToken,
        ctx: ReportContext,
        report: &ReportWithInfo<I>,
    ) -> anyhow::Result<()> {
        let key = report_fingerprint(&report.report);
        if self.cooldowns.is_cooling_down(&key, Utc::now()) {
            self.suppressed.fetch_add(1, Ordering::Relaxed);
            debug!(
                seq_nr = ctx.seq_nr,
                fingerprint = %hex::encode(&key[..4]),
                "report cooling down, not resubmitted"
            );
            return Ok(());
        }

        self.inner.transmit(cancel, ctx, report).await?;
        self.cooldowns.cool_down_for(key, self.cooldown);
        self.submitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
