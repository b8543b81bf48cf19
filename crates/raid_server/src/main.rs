//! Raid Orchestrator - Headless Host
//!
//! Usage: `raid_server [config-path] [initial-raid-tier]`

use raid_core::composition::Tier;
use raid_server::ServerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut config = ServerConfig::default();
    let mut args = std::env::args().skip(1);
    if let Some(path) = args.next() {
        config.config_path = path.into();
    }
    config.initial_raid = args.next().map(|tier| Tier::parse_or_default(&tier));
    tracing::info!(config = %config.config_path.display(), "Starting raid host");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
        }
    };

    match raid_server::run(config, shutdown).await {
        Ok(report) => tracing::info!(
            agents = report.agents_killed,
            cosmetics = report.cosmetics_removed,
            "Raid host stopped"
        ),
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}
