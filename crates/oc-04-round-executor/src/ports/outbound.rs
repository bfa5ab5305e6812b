//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Every call takes a cancellation token. The executor cancels it when the
//! phase deadline passes or the round is cancelled, so implementations doing
//! I/O should stop promptly once it fires.

use async_trait::async_trait;
use shared_types::{
    AttributedObservation, ConfigDigest, Observation, Outcome, OutcomeContext, Query,
    ReportContext, ReportWithInfo, SeqNr,
};
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Application logic driven through the round phases.
///
/// Payloads are opaque bytes; their schema belongs to the plugin.
#[async_trait]
pub trait ReportingPlugin: Send + Sync {
    /// Metadata carried alongside each report for accept/transmit policy.
    type ReportInfo: Clone + fmt::Debug + Send + Sync + 'static;

    /// Leader only.
    async fn query(&self, cancel: &CancellationToken, ctx: OutcomeContext<'_>)
        -> anyhow::Result<Query>;

    /// Every member, leader included.
    async fn observation(
        &self,
        cancel: &CancellationToken,
        ctx: OutcomeContext<'_>,
        query: &[u8],
    ) -> anyhow::Result<Observation>;

    /// Leader only. `Err` marks the observation invalid.
    async fn validate_observation(
        &self,
        cancel: &CancellationToken,
        ctx: OutcomeContext<'_>,
        query: &[u8],
        observation: &AttributedObservation,
    ) -> anyhow::Result<()>;

    /// Leader only. Aggregates the validated observations.
    async fn outcome(
        &self,
        cancel: &CancellationToken,
        ctx: OutcomeContext<'_>,
        query: &[u8],
        observations: &[AttributedObservation],
    ) -> anyhow::Result<Outcome>;

    /// Leader only. Zero or more reports derived from the outcome.
    async fn reports(
        &self,
        cancel: &CancellationToken,
        seq_nr: SeqNr,
        outcome: &[u8],
    ) -> anyhow::Result<Vec<ReportWithInfo<Self::ReportInfo>>>;

    async fn should_accept_attested_report(
        &self,
        cancel: &CancellationToken,
        seq_nr: SeqNr,
        report: &ReportWithInfo<Self::ReportInfo>,
    ) -> anyhow::Result<bool>;

    async fn should_transmit_accepted_report(
        &self,
        cancel: &CancellationToken,
        seq_nr: SeqNr,
        report: &ReportWithInfo<Self::ReportInfo>,
    ) -> anyhow::Result<bool>;
}

/// Publishes approved reports to their destination.
///
/// Failures are recorded on the round result but never reopen the round.
#[async_trait]
pub trait ContractTransmitter<I: Send + Sync>: Send + Sync {
    async fn transmit(
        &self,
        cancel: &CancellationToken,
        ctx: ReportContext,
        report: &ReportWithInfo<I>,
    ) -> anyhow::Result<()>;
}

/// Reads back the currently active config digest before reports leave the
/// node.
#[async_trait]
pub trait DigestGuard: Send + Sync {
    async fn current_digest(&self, cancel: &CancellationToken) -> anyhow::Result<ConfigDigest>;
}
