//! # Committee Round Flows
//!
//! Round executor driving a scripted price committee, with its failures
//! routed into the health reporter and its transmissions through the
//! cooldown cache.
//!
//! ## Flows Tested
//!
//! 1. **Executor (oc-04) → Health (oc-03)**: phase errors stay inspectable
//!    after aggregation
//! 2. **Validation policy**: `f` faulty observers abort under strict
//!    validation and are tolerated when excluded
//! 3. **Executor (oc-04) → Cooldown (oc-02)**: identical reports are
//!    transmitted once per cooldown window

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Duration as ChronoDuration;
    use node_runtime::adapters::CooldownTransmitter;
    use oc_02_cooldown_cache::CooldownCache;
    use oc_03_health_reporter::{HealthApi, HealthReporter, HealthReporterConfig};
    use oc_04_round_executor::{
        KeyedLeaderSelector, LeaderSelector, RoundError, RoundExecutor, RoundExecutorApi,
        RoundExecutorConfig, RoundPhase, ValidationPolicy,
    };
    use shared_types::{ConfigDigest, ConfigDigestPrefix, OracleId};
    use tokio_util::sync::CancellationToken;

    use crate::integration::fixtures::{
        decode_price, price, price_committee, PricePlugin, RecordingTransmitter, Script,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn digest(seed: u8) -> ConfigDigest {
        ConfigDigest([seed; 32]).with_prefix(ConfigDigestPrefix::EVM)
    }

    fn executor(
        script: Script,
        policy: ValidationPolicy,
        transmitter: Arc<RecordingTransmitter>,
    ) -> RoundExecutor<PricePlugin> {
        let config = RoundExecutorConfig {
            validation_policy: policy,
            ..RoundExecutorConfig::default()
        };
        RoundExecutor::new(
            config,
            price_committee(4, Arc::new(script)),
            1,
            digest(1),
            transmitter,
        )
    }

    // =============================================================================
    // EXECUTOR → HEALTH REPORTER
    // =============================================================================

    #[tokio::test]
    async fn test_round_errors_are_inspectable_in_health_report() {
        let health = HealthReporter::start(HealthReporterConfig::new(Duration::from_secs(60)))
            .unwrap();
        let script = Script {
            failing_observer: Some(2),
            ..Script::default()
        };
        let mut executor = executor(
            script,
            ValidationPolicy::Strict,
            Arc::new(RecordingTransmitter::default()),
        );
        let cancel = CancellationToken::new();

        for _ in 0..3 {
            let mut result = executor.run_round(&cancel).await;
            assert_eq!(result.report_count(), 0);
            if let Some(err) = result.error.take() {
                health.add("round-executor", anyhow::Error::new(err));
            }
        }

        let report = health.report();
        let joined = &report["round-executor"];
        assert_eq!(joined.len(), 3);
        assert!(joined.contains::<RoundError>());
        for error in joined.errors() {
            assert!(matches!(
                error.downcast_ref::<RoundError>(),
                Some(RoundError::Observation { observer, .. }) if *observer == OracleId(2)
            ));
        }
        // Every aborted round still consumed its sequence number
        assert_eq!(executor.next_seq_nr(), 4);

        health.close().await.unwrap();
    }

    // =============================================================================
    // VALIDATION POLICY
    // =============================================================================

    fn one_garbage_observer() -> Script {
        let mut script = Script::default();
        script.observations.insert(0, price(101));
        script.observations.insert(1, price(99));
        script.observations.insert(2, price(100));
        script.observations.insert(3, b"garbage".to_vec());
        script
    }

    #[tokio::test]
    async fn test_strict_validation_aborts_on_faulty_observer() {
        let mut executor = executor(
            one_garbage_observer(),
            ValidationPolicy::Strict,
            Arc::new(RecordingTransmitter::default()),
        );
        let result = executor.run_round(&CancellationToken::new()).await;

        assert!(matches!(
            result.error,
            Some(RoundError::ValidateObservation { observer, .. }) if observer == OracleId(3)
        ));
        assert_eq!(result.error.as_ref().map(RoundError::phase), Some(RoundPhase::Validate));
        assert!(!result.outcome_updated);
    }

    #[tokio::test]
    async fn test_excluding_invalid_tolerates_f_faulty_observers() {
        let transmitter = Arc::new(RecordingTransmitter::default());
        let mut executor = executor(
            one_garbage_observer(),
            ValidationPolicy::ExcludeInvalid,
            transmitter.clone(),
        );
        let result = executor.run_round(&CancellationToken::new()).await;

        assert!(result.is_success(), "{:?}", result.error);
        assert_eq!(decode_price(&result.outcome).unwrap(), 100);
        assert_eq!(transmitter.count(), 1);
    }

    #[tokio::test]
    async fn test_excluding_invalid_still_requires_quorum() {
        let mut script = one_garbage_observer();
        script.observations.insert(2, b"bad".to_vec());
        let mut executor = executor(
            script,
            ValidationPolicy::ExcludeInvalid,
            Arc::new(RecordingTransmitter::default()),
        );
        let result = executor.run_round(&CancellationToken::new()).await;

        assert!(matches!(
            result.error,
            Some(RoundError::InsufficientObservations {
                valid: 2,
                required: 3
            })
        ));
    }

    // =============================================================================
    // EXECUTOR → COOLDOWN CACHE
    // =============================================================================

    #[tokio::test]
    async fn test_identical_reports_transmitted_once_per_cooldown() {
        let recorder = Arc::new(RecordingTransmitter::default());
        let cooldowns = Arc::new(CooldownCache::new());
        let transmitter = Arc::new(CooldownTransmitter::new(
            recorder.clone(),
            cooldowns.clone(),
            ChronoDuration::minutes(10),
        ));
        let mut executor = RoundExecutor::new(
            RoundExecutorConfig::default(),
            price_committee(4, Arc::new(Script::default())),
            1,
            digest(1),
            transmitter,
        );
        let cancel = CancellationToken::new();

        for _ in 0..3 {
            let result = executor.run_round(&cancel).await;
            assert!(result.is_success());
            assert_eq!(result.transmitted.len(), 1);
        }

        // Every round approved the same price; only the first reached the chain
        assert_eq!(recorder.count(), 1);
        assert_eq!(cooldowns.len(), 1);
        assert_eq!(recorder.sent.lock()[0].0.seq_nr, 1);
    }

    // =============================================================================
    // LEADER AGREEMENT
    // =============================================================================

    #[test]
    fn test_independent_nodes_agree_on_leaders() {
        let node_a = KeyedLeaderSelector;
        let node_b = KeyedLeaderSelector;
        let mut leaders = HashSet::new();

        for seq_nr in 1..=200 {
            let a = node_a.select(&digest(7), seq_nr, 4);
            assert_eq!(a, node_b.select(&digest(7), seq_nr, 4));
            leaders.insert(a.unwrap());
        }
        // Leadership rotates over the whole committee
        assert_eq!(leaders.len(), 4);
    }
}
