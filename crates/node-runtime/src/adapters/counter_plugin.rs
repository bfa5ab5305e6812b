//! Demo reporting plugin
//!
//! Every member observes "previous counter + 1"; the leader settles on the
//! median and reports it. Enough to exercise every round phase end to end
//! without an external data source.

use crate::ports::PluginFactory;
use anyhow::{bail, Context};
use async_trait::async_trait;
use oc_04_round_executor::ReportingPlugin;
use shared_types::{
    AttributedObservation, ContractConfig, Observation, OracleId, OracleIdentity, Outcome,
    OutcomeContext, Query, ReportWithInfo, SeqNr,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Metadata attached to each counter report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterReportInfo {
    pub value: u64,
    pub seq_nr: SeqNr,
}

/// Plugin instance acting for one committee member.
pub struct CounterPlugin {
    oracle: OracleId,
}

impl CounterPlugin {
    pub fn new(oracle: OracleId) -> Self {
        Self { oracle }
    }

    pub fn oracle(&self) -> OracleId {
        self.oracle
    }
}

/// Counter payloads are 8 bytes big-endian; empty means zero.
pub fn decode_counter(bytes: &[u8]) -> anyhow::Result<u64> {
    if bytes.is_empty() {
        return Ok(0);
    }
    let raw: [u8; 8] = bytes
        .try_into()
        .with_context(|| format!("counter payload has {} bytes, want 8", bytes.len()))?;
    Ok(u64::from_be_bytes(raw))
}

#[async_trait]
impl ReportingPlugin for CounterPlugin {
    type ReportInfo = CounterReportInfo;

    async fn query(
        &self,
        _cancel: &CancellationToken,
        ctx: OutcomeContext<'_>,
    ) -> anyhow::Result<Query> {
        Ok(ctx.seq_nr.to_be_bytes().to_vec())
    }

    async fn observation(
        &self,
        _cancel: &CancellationToken,
        ctx: OutcomeContext<'_>,
        _query: &[u8],
    ) -> anyhow::Result<Observation> {
        let previous = decode_counter(ctx.previous_outcome).context("previous outcome")?;
        let next = previous.checked_add(1).context("counter overflow")?;
        Ok(next.to_be_bytes().to_vec())
    }

    async fn validate_observation(
        &self,
        _cancel: &CancellationToken,
        ctx: OutcomeContext<'_>,
        _query: &[u8],
        observation: &AttributedObservation,
    ) -> anyhow::Result<()> {
        if observation.observation.len() != 8 {
            bail!(
                "observation from {} has {} bytes",
                observation.observer,
                observation.observation.len()
            );
        }
        let previous = decode_counter(ctx.previous_outcome)?;
        let observed = decode_counter(&observation.observation)?;
        if observed <= previous {
            bail!(
                "observation from {} went backwards: {} <= {}",
                observation.observer,
                observed,
                previous
            );
        }
        Ok(())
    }

    async fn outcome(
        &self,
        _cancel: &CancellationToken,
        _ctx: OutcomeContext<'_>,
        _query: &[u8],
        observations: &[AttributedObservation],
    ) -> anyhow::Result<Outcome> {
        let mut values = observations
            .iter()
            .map(|o| decode_counter(&o.observation))
            .collect::<anyhow::Result<Vec<u64>>>()?;
        if values.is_empty() {
            bail!("no observations to aggregate");
        }
        values.sort_unstable();
        Ok(values[values.len() / 2].to_be_bytes().to_vec())
    }

    async fn reports(
        &self,
        _cancel: &CancellationToken,
        seq_nr: SeqNr,
        outcome: &[u8],
    ) -> anyhow::Result<Vec<ReportWithInfo<Self::ReportInfo>>> {
        let value = decode_counter(outcome)?;
        Ok(vec![ReportWithInfo::new(
            outcome.to_vec(),
            CounterReportInfo { value, seq_nr },
        )])
    }

    async fn should_accept_attested_report(
        &self,
        _cancel: &CancellationToken,
        seq_nr: SeqNr,
        report: &ReportWithInfo<Self::ReportInfo>,
    ) -> anyhow::Result<bool> {
        Ok(report.info.seq_nr == seq_nr)
    }

    async fn should_transmit_accepted_report(
        &self,
        _cancel: &CancellationToken,
        _seq_nr: SeqNr,
        report: &ReportWithInfo<Self::ReportInfo>,
    ) -> anyhow::Result<bool> {
        Ok(report.info.value > 0)
    }
}

/// Builds one `CounterPlugin` per committee member.
#[derive(Debug, Default, Clone, Copy)]
pub struct CounterPluginFactory;

impl PluginFactory for CounterPluginFactory {
    type Plugin = CounterPlugin;

    fn new_plugin(
        &self,
        member: &OracleIdentity,
        _config: &ContractConfig,
    ) -> anyhow::Result<Arc<CounterPlugin>> {
        Ok(Arc::new(CounterPlugin::new(member.id)))
    }
}
