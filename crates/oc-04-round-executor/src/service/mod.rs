//! Round Executor service
//!
//! Drives a committee of reporting plugins through one round per call to
//! `run_round`, owning the sequence number and the previous outcome.

use crate::domain::{
    KeyedLeaderSelector, LeaderSelector, RoundPhase, RoundResult, RoundState, ValidationPolicy,
};
use crate::error::{ExecutorResult, RoundError};
use crate::metrics;
use crate::ports::inbound::RoundExecutorApi;
use crate::ports::outbound::{ContractTransmitter, DigestGuard, ReportingPlugin};
use async_trait::async_trait;
use shared_types::{
    AttributedObservation, ConfigDigest, OracleId, Outcome, OutcomeContext, ReportContext,
    ReportWithInfo, SeqNr,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};


/// A committee member: its id and the plugin instance acting for it.
pub type Member<P> = (OracleId, Arc<P>);

/// Round executor configuration
#[derive(Clone, Debug)]
pub struct RoundExecutorConfig {
    pub max_duration_query: Duration,
    pub max_duration_observation: Duration,
    pub max_duration_validate_observation: Duration,
    pub max_duration_outcome: Duration,
    pub max_duration_reports: Duration,
    pub max_duration_should_accept_attested_report: Duration,
    pub max_duration_should_transmit_accepted_report: Duration,
    /// Per-report limit on the transmitter hand-off
    pub max_duration_transmit: Duration,
    pub validation_policy: ValidationPolicy,
    /// Rounds per epoch used to derive `ReportContext` coordinates
    pub rounds_per_epoch: u8,
}

impl Default for RoundExecutorConfig {
    fn default() -> Self {
        Self {
            max_duration_query: Duration::from_secs(5),
            max_duration_observation: Duration::from_secs(5),
            max_duration_validate_observation: Duration::from_secs(1),
            max_duration_outcome: Duration::from_secs(5),
            max_duration_reports: Duration::from_secs(5),
            max_duration_should_accept_attested_report: Duration::from_secs(10),
            max_duration_should_transmit_accepted_report: Duration::from_secs(10),
            max_duration_transmit: Duration::from_secs(10),
            validation_policy: ValidationPolicy::Strict,
            rounds_per_epoch: u8::MAX,
        }
    }
}

/// Leader-driven round state machine.
///
/// Owns `next_seq_nr` and `previous_outcome`; plugins only ever see the
/// previous outcome through a read-only `OutcomeContext`.
pub struct RoundExecutor<P: ReportingPlugin> {
    config: RoundExecutorConfig,
    members: Vec<Member<P>>,
    f: u8,
    config_digest: ConfigDigest,
    next_seq_nr: SeqNr,
    previous_outcome: Outcome,
    leader_selector: Arc<dyn LeaderSelector>,
    transmitter: Arc<dyn ContractTransmitter<P::ReportInfo>>,
    digest_guard: Option<Arc<dyn DigestGuard>>,
}

impl<P: ReportingPlugin + 'static> RoundExecutor<P> {
    /// Start a fresh configuration at `seq_nr = 1` with an empty previous
    /// outcome.
    pub fn new(
        config: RoundExecutorConfig,
        members: Vec<Member<P>>,
        f: u8,
        config_digest: ConfigDigest,
        transmitter: Arc<dyn ContractTransmitter<P::ReportInfo>>,
    ) -> Self {
        Self {
            config,
            members,
            f,
            config_digest,
            next_seq_nr: 1,
            previous_outcome: Outcome::new(),
            leader_selector: Arc::new(KeyedLeaderSelector),
            transmitter,
            digest_guard: None,
        }
    }

    pub fn with_leader_selector(mut self, selector: Arc<dyn LeaderSelector>) -> Self {
        self.leader_selector = selector;
        self
    }

    /// Check the active digest before reports are handed to the transmitter.
    pub fn with_digest_guard(mut self, guard: Arc<dyn DigestGuard>) -> Self {
        self.digest_guard = Some(guard);
        self
    }

    /// Adopt a new configuration between rounds.
    ///
    /// Sequence numbers restart at 1 and the previous outcome is cleared.
    pub fn reconfigure(&mut self, members: Vec<Member<P>>, f: u8, config_digest: ConfigDigest) {
        info!(
            from = %self.config_digest.short(),
            to = %config_digest.short(),
            n = members.len(),
            f,
            "[oc-04] reconfigured"
        );
        self.members = members;
        self.f = f;
        self.config_digest = config_digest;
        self.next_seq_nr = 1;
        self.previous_outcome.clear();
    }

    /// Restore persisted state after a restart.
    pub fn resume(
        &mut self,
        members: Vec<Member<P>>,
        f: u8,
        config_digest: ConfigDigest,
        next_seq_nr: SeqNr,
        previous_outcome: Outcome,
    ) {
        info!(
            config_digest = %config_digest.short(),
            next_seq_nr,
            "[oc-04] resumed"
        );
        self.members = members;
        self.f = f;
        self.config_digest = config_digest;
        self.next_seq_nr = next_seq_nr.max(1);
        self.previous_outcome = previous_outcome;
    }

    pub fn config(&self) -> &RoundExecutorConfig {
        &self.config
    }

    pub fn committee_size(&self) -> usize {
        self.members.len()
    }

    pub fn f(&self) -> u8 {
        self.f
    }

    /// Minimum number of valid observations, `n - f`.
    pub fn quorum(&self) -> usize {
        self.members.len().saturating_sub(usize::from(self.f))
    }

    async fn execute(
        &mut self,
        seq_nr: SeqNr,
        cancel: &CancellationToken,
        result: &mut RoundResult<P::ReportInfo>,
    ) -> ExecutorResult<()> {
        let members = self.members.clone();
        let digest = self.config_digest;
        let previous = self.previous_outcome.clone();
        let ctx = OutcomeContext {
            seq_nr,
            previous_outcome: &previous,
        };

        // LeaderSelect
        let leader_idx = self
            .leader_selector
            .select(&digest, seq_nr, members.len())
            .ok_or(RoundError::EmptyCommittee)?;
        let (leader_id, leader) =
            members
                .get(leader_idx)
                .cloned()
                .ok_or(RoundError::InvalidLeader {
                    index: leader_idx,
                    n: members.len(),
                })?;
        result.leader = Some(leader_id);
        debug!(seq_nr, leader = %leader_id, "[oc-04] leader selected");
        result.state = result.state.advance();

        // Query
        let token = cancel.child_token();
        let query = guarded(
            RoundPhase::Query,
            self.config.max_duration_query,
            cancel,
            &token,
            leader.query(&token, ctx),
        )
        .await?
        .map_err(RoundError::Query)?;
        debug!(seq_nr, query_len = query.len(), "[oc-04] query built");
        result.state = result.state.advance();

        // Observe
        let mut observations = Vec::with_capacity(members.len());
        for (observer, plugin) in &members {
            let token = cancel.child_token();
            let observation = guarded(
                RoundPhase::Observe,
                self.config.max_duration_observation,
                cancel,
                &token,
                plugin.observation(&token, ctx, &query),
            )
            .await?
            .map_err(|source| RoundError::Observation {
                observer: *observer,
                source,
            })?;
            observations.push(AttributedObservation {
                observation,
                observer: *observer,
            });
        }
        debug!(seq_nr, count = observations.len(), "[oc-04] observations collected");
        result.state = result.state.advance();

        // Validate
        let observations = self
            .validate(ctx, &query, &leader, observations, cancel)
            .await?;
        result.state = result.state.advance();

        // Outcome
        let token = cancel.child_token();
        let outcome = guarded(
            RoundPhase::Outcome,
            self.config.max_duration_outcome,
            cancel,
            &token,
            leader.outcome(&token, ctx, &query, &observations),
        )
        .await?
        .map_err(RoundError::Outcome)?;
        self.previous_outcome = outcome.clone();
        result.outcome = outcome;
        result.outcome_updated = true;
        debug!(seq_nr, outcome_len = result.outcome.len(), "[oc-04] outcome computed");
        result.state = result.state.advance();

        // GenerateReports
        let token = cancel.child_token();
        let reports = guarded(
            RoundPhase::GenerateReports,
            self.config.max_duration_reports,
            cancel,
            &token,
            leader.reports(&token, seq_nr, &result.outcome),
        )
        .await?
        .map_err(RoundError::Reports)?;
        debug!(seq_nr, count = reports.len(), "[oc-04] reports generated");
        result.state = result.state.advance();

        // Leader votes first, then the rest in committee order
        let mut voters = Vec::with_capacity(members.len());
        voters.push((leader_id, leader.clone()));
        voters.extend(
            members
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != leader_idx)
                .map(|(_, m)| m.clone()),
        );

        // AcceptDecision
        let mut accepted = Vec::with_capacity(reports.len());
        for report in reports {
            if self.accept_vote(seq_nr, &voters, &report, cancel).await? {
                accepted.push(report);
            } else {
                result.not_accepted.push(report);
            }
        }
        result.state = result.state.advance();

        // TransmitDecision
        for report in accepted {
            if self.transmit_vote(seq_nr, &voters, &report, cancel).await? {
                result.transmitted.push(report);
            } else {
                result.not_transmitted.push(report);
            }
        }

        if let Some(guard) = &self.digest_guard {
            let token = cancel.child_token();
            let actual = guarded(
                RoundPhase::TransmitDecision,
                self.config.max_duration_should_transmit_accepted_report,
                cancel,
                &token,
                guard.current_digest(&token),
            )
            .await?
            .map_err(RoundError::ConfigCheck)?;
            if actual != digest {
                return Err(RoundError::ConfigMismatch {
                    expected: digest,
                    actual,
                });
            }
        }
        Ok(())
    }

    async fn validate(
        &self,
        ctx: OutcomeContext<'_>,
        query: &[u8],
        leader: &Arc<P>,
        observations: Vec<AttributedObservation>,
        cancel: &CancellationToken,
    ) -> ExecutorResult<Vec<AttributedObservation>> {
        let policy = self.config.validation_policy;
        let mut valid = Vec::with_capacity(observations.len());

        for observation in observations {
            let token = cancel.child_token();
            let verdict = guarded(
                RoundPhase::Validate,
                self.config.max_duration_validate_observation,
                cancel,
                &token,
                leader.validate_observation(&token, ctx, query, &observation),
            )
            .await;

            match (verdict, policy) {
                (Ok(Ok(())), _) => valid.push(observation),
                (Ok(Err(source)), ValidationPolicy::Strict) => {
                    return Err(RoundError::ValidateObservation {
                        observer: observation.observer,
                        source,
                    });
                }
                (Ok(Err(source)), ValidationPolicy::ExcludeInvalid) => {
                    warn!(
                        seq_nr = ctx.seq_nr,
                        observer = %observation.observer,
                        error = %source,
                        "[oc-04] excluding invalid observation"
                    );
                }
                (Err(err @ RoundError::DeadlineExceeded { .. }), ValidationPolicy::ExcludeInvalid) => {
                    warn!(
                        seq_nr = ctx.seq_nr,
                        observer = %observation.observer,
                        error = %err,
                        "[oc-04] excluding observation, validation timed out"
                    );
                }
                (Err(err), _) => return Err(err),
            }
        }

        if policy == ValidationPolicy::ExcludeInvalid {
            let required = self.quorum();
            if valid.len() < required {
                return Err(RoundError::InsufficientObservations {
                    valid: valid.len(),
                    required,
                });
            }
        }
        debug!(seq_nr = ctx.seq_nr, valid = valid.len(), "[oc-04] observations validated");
        Ok(valid)
    }

    /// True only if every voter accepts.
    async fn accept_vote(
        &self,
        seq_nr: SeqNr,
        voters: &[Member<P>],
        report: &ReportWithInfo<P::ReportInfo>,
        cancel: &CancellationToken,
    ) -> ExecutorResult<bool> {
        for (member, plugin) in voters {
            let token = cancel.child_token();
            let accepted = guarded(
                RoundPhase::AcceptDecision,
                self.config.max_duration_should_accept_attested_report,
                cancel,
                &token,
                plugin.should_accept_attested_report(&token, seq_nr, report),
            )
            .await?
            .map_err(|source| RoundError::ShouldAcceptAttestedReport {
                member: *member,
                source,
            })?;
            if !accepted {
                debug!(seq_nr, member = %member, "[oc-04] report not accepted");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// True only if every voter approves transmission.
    async fn transmit_vote(
        &self,
        seq_nr: SeqNr,
        voters: &[Member<P>],
        report: &ReportWithInfo<P::ReportInfo>,
        cancel: &CancellationToken,
    ) -> ExecutorResult<bool> {
        for (member, plugin) in voters {
            let token = cancel.child_token();
            let approved = guarded(
                RoundPhase::TransmitDecision,
                self.config.max_duration_should_transmit_accepted_report,
                cancel,
                &token,
                plugin.should_transmit_accepted_report(&token, seq_nr, report),
            )
            .await?
            .map_err(|source| RoundError::ShouldTransmitAcceptedReport {
                member: *member,
                source,
            })?;
            if !approved {
                debug!(seq_nr, member = %member, "[oc-04] report not transmitted");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Hand every transmitted report to the transmitter. Failures are
    /// collected on the result and never abort the round.
    async fn hand_off(&self, cancel: &CancellationToken, result: &mut RoundResult<P::ReportInfo>) {
        let ctx = ReportContext::from_seq_nr(
            result.config_digest,
            result.seq_nr,
            self.config.rounds_per_epoch,
        );
        for report in &result.transmitted {
            let token = cancel.child_token();
            let sent = guarded(
                RoundPhase::TransmitDecision,
                self.config.max_duration_transmit,
                cancel,
                &token,
                self.transmitter.transmit(&token, ctx, report),
            )
            .await;
            let err = match sent {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err,
                Err(err) => anyhow::Error::new(err),
            };
            metrics::record_transmit_failure();
            error!(
                seq_nr = result.seq_nr,
                epoch = ctx.epoch,
                round = ctx.round,
                error = %err,
                "[oc-04] transmission failed"
            );
            result.transmit_errors.push(err);
        }
    }
}

#[async_trait]
impl<P: ReportingPlugin + 'static> RoundExecutorApi for RoundExecutor<P> {
    type ReportInfo = P::ReportInfo;

    async fn run_round(&mut self, cancel: &CancellationToken) -> RoundResult<P::ReportInfo> {
        let seq_nr = self.next_seq_nr;
        let mut result =
            RoundResult::new(seq_nr, self.config_digest, self.previous_outcome.clone());

        // `u64::MAX` is never run so that no sequence number is handed out twice
        let Some(next) = seq_nr.checked_add(1) else {
            let err = RoundError::SeqNrExhausted {
                config_digest: self.config_digest,
            };
            error!(seq_nr, error = %err, "[oc-04] round refused");
            metrics::record_round_aborted(err.kind());
            result.abort(err);
            return result;
        };
        self.next_seq_nr = next;
        metrics::record_round_started();

        match self.execute(seq_nr, cancel, &mut result).await {
            Ok(()) => {
                result.state = RoundState::Done;
                self.hand_off(cancel, &mut result).await;
                metrics::record_round_succeeded(
                    result.transmitted.len(),
                    result.not_accepted.len(),
                    result.not_transmitted.len(),
                );
                info!(
                    seq_nr,
                    config_digest = %result.config_digest.short(),
                    leader = ?result.leader,
                    transmitted = result.transmitted.len(),
                    not_accepted = result.not_accepted.len(),
                    not_transmitted = result.not_transmitted.len(),
                    transmit_errors = result.transmit_errors.len(),
                    "[oc-04] round complete"
                );
            }
            Err(err) => {
                metrics::record_round_aborted(err.kind());
                warn!(
                    seq_nr,
                    config_digest = %result.config_digest.short(),
                    phase = %err.phase(),
                    outcome_updated = result.outcome_updated,
                    error = &err as &dyn std::error::Error,
                    "[oc-04] round aborted"
                );
                result.abort(err);
            }
        }
        result
    }

    fn next_seq_nr(&self) -> SeqNr {
        self.next_seq_nr
    }

    fn previous_outcome(&self) -> &[u8] {
        &self.previous_outcome
    }

    fn config_digest(&self) -> ConfigDigest {
        self.config_digest
    }
}

/// Run one phase call against the caller's cancellation and the phase
/// deadline. `phase_cancel` is fired when either wins so the plugin can tear
/// down in-flight work.
async fn guarded<T, F>(
    phase: RoundPhase,
    limit: Duration,
    cancel: &CancellationToken,
    phase_cancel: &CancellationToken,
    fut: F,
) -> ExecutorResult<anyhow::Result<T>>
where
    F: Future<Output = anyhow::Result<T>>,
{
    if cancel.is_cancelled() {
        phase_cancel.cancel();
        return Err(RoundError::Cancelled { phase });
    }
    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RoundError::Cancelled { phase }),
        res = tokio::time::timeout(limit, fut) => {
            res.map_err(|_| RoundError::DeadlineExceeded { phase, timeout: limit })
        }
    };
    if outcome.is_err() {
        phase_cancel.cancel();
    }
    outcome
}
