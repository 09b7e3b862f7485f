//! # Business-Network Node
//!
//! Runs the membership lifecycle on an in-process network: an operator node
//! founds a business network and takes one member through request,
//! activation, suspension, reactivation and revocation.
//!
//! ## Startup Sequence
//!
//! 1. Install logging (`RUST_LOG`, else `BN_LOG_LEVEL`)
//! 2. Load configuration from `BN_*` variables
//! 3. Start the notary, the session network and both nodes
//! 4. Run the scenario and report each finalized transaction
//! 5. Print the report as JSON on stdout

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use bn_node::container::config::{DEFAULT_LOG_LEVEL, LOG_LEVEL_VAR};
use bn_node::container::NodeIdentityConfig;
use bn_node::{load_config, run_lifecycle, LocalNetwork};

const MEMBER_NAME: &str = "O=Member, L=New York, C=US";
const STEP_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(std::env::var(LOG_LEVEL_VAR).unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()))
    });
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config().context("Invalid node configuration")?;

    info!("===========================================");
    info!("  Business-Network Node v{}", env!("CARGO_PKG_VERSION"));
    info!("  Policy: {}", config.membership.policy);
    info!("===========================================");

    let network = LocalNetwork::new(&config);
    let operator = network
        .spawn_node_with(&config.identity)
        .context("Failed to start operator node")?;
    let member = network
        .spawn_node_with(&NodeIdentityConfig {
            name: MEMBER_NAME.to_string(),
            key_seed: None,
        })
        .context("Failed to start member node")?;

    let report = run_lifecycle(&operator, &member, None, STEP_TIMEOUT)
        .await
        .context("Membership lifecycle failed")?;

    for step in &report.steps {
        let status = step
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        info!("{:<12} {:<10} {}", step.command.to_string(), status, step.tx_id);
    }
    info!(
        network_id = %report.network_id,
        transactions = report.steps.len(),
        notarised_inputs = network.notary().consumed_count(),
        "Done"
    );
    println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    Ok(())
}
