//! # Config Epoch Flows
//!
//! Digests computed by the digester, the same digests read back through the
//! transforming tracker, and the round executor following configuration
//! changes.
//!
//! ## Flows Tested
//!
//! 1. **Digester ≡ tracker**: `TransformingConfigDigester` and
//!    `DigestTransformingTracker` agree for the same discriminator
//! 2. **Instance isolation**: discriminated instances share the prefix but
//!    not the digest
//! 3. **Tracker (oc-01) → Executor (oc-04)**: a configuration change under a
//!    running committee aborts with a digest mismatch; reconfiguring restarts
//!    the sequence
//! 4. **Node runtime**: a local node transmits under the transformed digest

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use node_runtime::adapters::{CounterPluginFactory, InMemoryOutcomeStore, TrackerDigestGuard};
    use node_runtime::container::{local_contract_config, local_tracker};
    use node_runtime::{NodeConfig, OracleNode};
    use oc_01_config_tracking::{
        ConfigDigester, ContractConfigTracker, DigestTransformingTracker, DiscriminatorTransform,
        InMemoryConfigTracker, Keccak256ConfigDigester, TransformingConfigDigester,
    };
    use oc_03_health_reporter::{HealthReporter, HealthReporterConfig};
    use oc_04_round_executor::{RoundError, RoundExecutor, RoundExecutorApi, RoundExecutorConfig};
    use shared_types::{Committee, ConfigDigestPrefix, ContractConfig};
    use tokio_util::sync::CancellationToken;

    use crate::integration::fixtures::{price_committee, RecordingTransmitter, Script};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn base_digester() -> Keccak256ConfigDigester {
        Keccak256ConfigDigester::evm(1337, vec![0x0c; 20])
    }

    fn contract_config(config_count: u64) -> ContractConfig {
        local_contract_config(&base_digester(), 4, 1, config_count).unwrap()
    }

    // =============================================================================
    // DIGESTS
    // =============================================================================

    #[tokio::test]
    async fn test_digester_and_tracker_agree_on_transformed_digest() {
        let config = contract_config(1);
        let source = Arc::new(InMemoryConfigTracker::with_config(config.clone()));
        let tracker = DigestTransformingTracker::new(
            source,
            DiscriminatorTransform::new(b"commit".to_vec()),
        );
        let digester = TransformingConfigDigester::new(
            base_digester(),
            DiscriminatorTransform::new(b"commit".to_vec()),
        );
        let cancel = CancellationToken::new();

        let details = tracker.latest_config_details(&cancel).await.unwrap();
        let full = tracker
            .latest_config(&cancel, details.changed_in_block)
            .await
            .unwrap();

        assert_eq!(details.config_digest, digester.config_digest(&config).unwrap());
        assert_eq!(details.config_digest, full.config_digest);
        assert_eq!(details.config_digest.prefix(), digester.config_digest_prefix());
    }

    #[tokio::test]
    async fn test_discriminated_instances_share_prefix_only() {
        let (source_a, tracker_a) = local_tracker(b"commit".to_vec());
        let (source_b, tracker_b) = local_tracker(b"execute".to_vec());
        source_a.set_config(contract_config(1));
        source_b.set_config(contract_config(1));
        let cancel = CancellationToken::new();

        let a = tracker_a.latest_config_details(&cancel).await.unwrap();
        let b = tracker_b.latest_config_details(&cancel).await.unwrap();

        assert_ne!(a.config_digest, b.config_digest);
        assert_eq!(a.config_digest.prefix(), ConfigDigestPrefix::EVM);
        assert_eq!(b.config_digest.prefix(), ConfigDigestPrefix::EVM);
    }

    // =============================================================================
    // TRACKER → EXECUTOR
    // =============================================================================

    #[tokio::test]
    async fn test_executor_follows_configuration_change() {
        let first = contract_config(1);
        let second = contract_config(2);
        let source = Arc::new(InMemoryConfigTracker::with_config(first.clone()));
        let transmitter = Arc::new(RecordingTransmitter::default());
        let committee = Committee::from_contract_config(&first).unwrap();
        let script = Arc::new(Script::default());

        let mut executor = RoundExecutor::new(
            RoundExecutorConfig::default(),
            price_committee(4, script.clone()),
            committee.f(),
            first.config_digest,
            transmitter.clone(),
        )
        .with_digest_guard(Arc::new(TrackerDigestGuard::new(source.clone())));
        let cancel = CancellationToken::new();

        assert!(executor.run_round(&cancel).await.is_success());
        assert!(executor.run_round(&cancel).await.is_success());

        source.set_config(second.clone());
        let result = executor.run_round(&cancel).await;
        assert!(matches!(
            &result.error,
            Some(RoundError::ConfigMismatch { expected, actual })
                if *expected == first.config_digest && *actual == second.config_digest
        ));
        assert!(result.error.as_ref().is_some_and(RoundError::requires_config_refresh));
        assert_eq!(result.report_count(), 0);
        assert_eq!(transmitter.count(), 2);

        executor.reconfigure(price_committee(4, script), 1, second.config_digest);
        let result = executor.run_round(&cancel).await;
        assert!(result.is_success());
        assert_eq!(result.seq_nr, 1);

        let sent = transmitter.sent.lock();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[2].0.config_digest, second.config_digest);
        assert_eq!(sent[2].0.seq_nr, 1);
    }

    // =============================================================================
    // NODE RUNTIME
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_local_node_transmits_under_transformed_digest() {
        let (source, tracker) = local_tracker(b"node-0".to_vec());
        let config = contract_config(1);
        source.set_config(config.clone());
        let expected = tracker
            .latest_config_details(&CancellationToken::new())
            .await
            .unwrap()
            .config_digest;
        assert_ne!(expected, config.config_digest);

        let node_config = NodeConfig {
            round_interval: Duration::from_millis(10),
            max_rounds: Some(3),
            ..NodeConfig::default()
        };
        let health = Arc::new(HealthReporter::start(HealthReporterConfig::default()).unwrap());
        let transmitter = Arc::new(RecordingTransmitter::default());
        let mut node = OracleNode::new(
            node_config,
            tracker,
            CounterPluginFactory,
            transmitter.clone(),
            Arc::new(InMemoryOutcomeStore::new()),
            health,
        )
        .unwrap();

        let stats = node.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(stats.rounds_succeeded, 3);
        let sent = transmitter.sent.lock();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|(ctx, _)| ctx.config_digest == expected));
        assert_eq!(
            sent.iter().map(|(ctx, _)| ctx.seq_nr).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }
}
