//! Driving Ports (API - Inbound)

use crate::domain::RoundResult;
use async_trait::async_trait;
use shared_types::{ConfigDigest, SeqNr};
use tokio_util::sync::CancellationToken;

/// Round execution API.
#[async_trait]
pub trait RoundExecutorApi: Send {
    type ReportInfo: Send;

    /// Run one round under the next sequence number.
    ///
    /// The sequence number advances whether or not the round succeeds.
    async fn run_round(&mut self, cancel: &CancellationToken) -> RoundResult<Self::ReportInfo>;

    /// Sequence number the next round will use.
    fn next_seq_nr(&self) -> SeqNr;

    /// Outcome of the most recent round whose Outcome phase succeeded.
    fn previous_outcome(&self) -> &[u8];

    /// Digest every round currently runs under.
    fn config_digest(&self) -> ConfigDigest;
}
