//! Per-round result record

use super::phase::RoundState;
use crate::error::RoundError;
use shared_types::{ConfigDigest, OracleId, Outcome, ReportWithInfo, SeqNr};

/// Everything a round produced.
///
/// INVARIANT: if `error` is set, all three report buckets are empty.
#[derive(Debug)]
pub struct RoundResult<I> {
    pub seq_nr: SeqNr,
    pub config_digest: ConfigDigest,
    /// `None` only when leader selection failed.
    pub leader: Option<OracleId>,
    /// Accepted and approved for transmission; handed to the transmitter.
    pub transmitted: Vec<ReportWithInfo<I>>,
    pub not_accepted: Vec<ReportWithInfo<I>>,
    pub not_transmitted: Vec<ReportWithInfo<I>>,
    /// The outcome the next round will see as its previous outcome.
    pub outcome: Outcome,
    /// True when this round's Outcome phase succeeded.
    pub outcome_updated: bool,
    /// Transmitter failures. These never set `error`.
    pub transmit_errors: Vec<anyhow::Error>,
    pub error: Option<RoundError>,
    pub state: RoundState,
}

impl<I> RoundResult<I> {
    pub(crate) fn new(seq_nr: SeqNr, config_digest: ConfigDigest, outcome: Outcome) -> Self {
        Self {
            seq_nr,
            config_digest,
            leader: None,
            transmitted: Vec::new(),
            not_accepted: Vec::new(),
            not_transmitted: Vec::new(),
            outcome,
            outcome_updated: false,
            transmit_errors: Vec::new(),
            error: None,
            state: RoundState::default(),
        }
    }

    /// Record the abort and discard every partial report.
    pub(crate) fn abort(&mut self, error: RoundError) {
        self.transmitted.clear();
        self.not_accepted.clear();
        self.not_transmitted.clear();
        self.state = self.state.abort();
        self.error = Some(error);
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Total reports across all three buckets.
    pub fn report_count(&self) -> usize {
        self.transmitted.len() + self.not_accepted.len() + self.not_transmitted.len()
    }
}
