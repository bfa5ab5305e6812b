//! Shared test doubles for the integration flows.

use anyhow::{bail, Context};
use async_trait::async_trait;
use oc_04_round_executor::{ContractTransmitter, Member, ReportingPlugin};
use parking_lot::Mutex;
use shared_types::{
    AttributedObservation, Observation, OracleId, Outcome, OutcomeContext, Query, ReportContext,
    ReportWithInfo, SeqNr,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Scripted behaviour for a committee of `PricePlugin`s.
#[derive(Default)]
pub struct Script {
    /// Raw observation bytes per oracle index. Missing entries observe 100.
    pub observations: HashMap<u8, Vec<u8>>,
    /// Oracle whose Observation call fails.
    pub failing_observer: Option<u8>,
}

/// Median-of-observations plugin with a single report per round.
pub struct PricePlugin {
    id: OracleId,
    script: Arc<Script>,
}

pub fn decode_price(bytes: &[u8]) -> anyhow::Result<u64> {
    let raw: [u8; 8] = bytes.try_into().context("price must be 8 bytes")?;
    Ok(u64::from_be_bytes(raw))
}

pub fn price(value: u64) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

#[async_trait]
impl ReportingPlugin for PricePlugin {
    type ReportInfo = ();

    async fn query(
        &self,
        _cancel: &CancellationToken,
        _ctx: OutcomeContext<'_>,
    ) -> anyhow::Result<Query> {
        Ok(Vec::new())
    }

    async fn observation(
        &self,
        _cancel: &CancellationToken,
        _ctx: OutcomeContext<'_>,
        _query: &[u8],
    ) -> anyhow::Result<Observation> {
        if self.script.failing_observer == Some(self.id.0) {
            bail!("price feed unreachable from {}", self.id);
        }
        Ok(self
            .script
            .observations
            .get(&self.id.0)
            .cloned()
            .unwrap_or_else(|| price(100)))
    }

    async fn validate_observation(
        &self,
        _cancel: &CancellationToken,
        _ctx: OutcomeContext<'_>,
        _query: &[u8],
        observation: &AttributedObservation,
    ) -> anyhow::Result<()> {
        decode_price(&observation.observation).map(|_| ())
    }

    async fn outcome(
        &self,
        _cancel: &CancellationToken,
        _ctx: OutcomeContext<'_>,
        _query: &[u8],
        observations: &[AttributedObservation],
    ) -> anyhow::Result<Outcome> {
        let mut prices = observations
            .iter()
            .map(|o| decode_price(&o.observation))
            .collect::<anyhow::Result<Vec<_>>>()?;
        prices.sort_unstable();
        Ok(price(prices[prices.len() / 2]))
    }

    async fn reports(
        &self,
        _cancel: &CancellationToken,
        _seq_nr: SeqNr,
        outcome: &[u8],
    ) -> anyhow::Result<Vec<ReportWithInfo<()>>> {
        Ok(vec![ReportWithInfo::new(outcome.to_vec(), ())])
    }

    async fn should_accept_attested_report(
        &self,
        _cancel: &CancellationToken,
        _seq_nr: SeqNr,
        _report: &ReportWithInfo<()>,
    ) -> anyhow::Result<bool> {
        Ok(true)
    }

    async fn should_transmit_accepted_report(
        &self,
        _cancel: &CancellationToken,
        _seq_nr: SeqNr,
        _report: &ReportWithInfo<()>,
    ) -> anyhow::Result<bool> {
        Ok(true)
    }
}

/// `n` in-process members sharing one script.
pub fn price_committee(n: u8, script: Arc<Script>) -> Vec<Member<PricePlugin>> {
    (0..n)
        .map(|i| {
            let id = OracleId(i);
            (
                id,
                Arc::new(PricePlugin {
                    id,
                    script: script.clone(),
                }),
            )
        })
        .collect()
}

/// Remembers every report handed to it.
#[derive(Default)]
pub struct RecordingTransmitter {
    pub sent: Mutex<Vec<(ReportContext, Vec<u8>)>>,
}

impl RecordingTransmitter {
    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl<I: Send + Sync> ContractTransmitter<I> for RecordingTransmitter {
    async fn transmit(
        &self,
        _cancel: &CancellationToken,
        ctx: ReportContext,
        report: &ReportWithInfo<I>,
    ) -> anyhow::Result<()> {
        self.sent.lock().push((ctx, report.report.clone()));
        Ok(())
    }
}
