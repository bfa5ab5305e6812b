//! # Oracle Node
//!
//! Runs a local oracle committee end to end:
//!
//! 1. Load `NodeConfig` and initialise telemetry
//! 2. Publish the local committee configuration to the in-memory tracker
//! 3. Start the health reporter and the `/metrics` endpoint
//! 4. Drive rounds until Ctrl+C or `OC_MAX_ROUNDS`
//! 5. Stop the metrics endpoint and close the health reporter

use std::sync::Arc;

use anyhow::{Context, Result};
use oc_01_config_tracking::Keccak256ConfigDigester;
use oc_03_health_reporter::{HealthApi, HealthReporter};
use oracle_telemetry::{init_telemetry, serve_metrics, TelemetryConfig};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use node_runtime::adapters::{CounterPluginFactory, InMemoryOutcomeStore, LoggingTransmitter};
use node_runtime::container::{
    local_contract_config, local_tracker, NodeConfig, LOCAL_CHAIN_ID, LOCAL_CONTRACT_ADDRESS,
};
use node_runtime::OracleNode;

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env().context("failed to load node configuration")?;
    let telemetry_config = TelemetryConfig::for_node(config.node_id);
    let metrics_port = telemetry_config.metrics_port;
    let metrics_enabled = telemetry_config.metrics_enabled();
    let _telemetry = init_telemetry(telemetry_config)?;

    info!("===========================================");
    info!("  Oracle Committee Node v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let digester = Keccak256ConfigDigester::evm(LOCAL_CHAIN_ID, LOCAL_CONTRACT_ADDRESS.to_vec());
    let (source, tracker) = local_tracker(config.instance_discriminator.clone());
    let committee = local_contract_config(
        &digester,
        config.committee_size,
        config.fault_tolerance,
        1,
    )?;
    source.set_config(committee);

    let health = Arc::new(HealthReporter::start(config.health.clone())?);
    let transmitter = Arc::new(LoggingTransmitter::new());
    let mut node = OracleNode::new(
        config,
        tracker,
        CounterPluginFactory,
        transmitter.clone(),
        Arc::new(InMemoryOutcomeStore::new()),
        health.clone(),
    )?;

    let cancel = CancellationToken::new();
    let metrics_server = metrics_enabled.then(|| {
        let stop = cancel.child_token();
        tokio::spawn(async move {
            if let Err(e) = serve_metrics(metrics_port, stop).await {
                warn!("Metrics endpoint unavailable: {}", e);
            }
        })
    });

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C received, shutting down");
                shutdown.cancel();
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    info!("Node is running. Press Ctrl+C to stop.");
    let stats = node.run(&cancel).await?;
    info!(
        rounds = stats.rounds_run,
        succeeded = stats.rounds_succeeded,
        aborted = stats.rounds_aborted,
        reports = stats.reports_transmitted,
        suppressed = stats.reports_suppressed,
        transmitted = transmitter.transmitted(),
        "Node stopped"
    );

    cancel.cancel();
    if let Some(handle) = metrics_server {
        handle.await?;
    }

    health.close().await?;
    Ok(())
}
