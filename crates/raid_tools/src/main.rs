//! Raid Orchestrator - Development Tools

use clap::{Parser, Subcommand};
use raid_core::composition::Tier;
use raid_core::config::RaidConfig;
use raid_tools::simulate::{run_simulation, SimulationOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "raid-tools")]
#[command(about = "Development tools for the raid orchestrator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate raid config files
    Validate {
        /// Config file or directory of .ron files
        #[arg(default_value = "config/raid.ron")]
        path: String,
    },
    /// Simulate one raid on a sandbox world
    Simulate {
        /// Raid tier (unknown names fall back to normal)
        #[arg(long, default_value = "normal")]
        tier: String,
        /// RNG seed
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Game seconds to simulate
        #[arg(long, default_value_t = 600.0)]
        seconds: f64,
        /// Simulate the base owner as offline
        #[arg(long)]
        offline: bool,
        /// Config file to use instead of defaults
        #[arg(long)]
        config: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating raid configs in: {path}");
            match raid_tools::validate::validate_path(std::path::Path::new(&path)) {
                Ok(validated) => {
                    for file in &validated {
                        println!("{}", file.path.display());
                        for line in file.tier_lines() {
                            println!("  {line}");
                        }
                    }
                    tracing::info!("Validation passed");
                }
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Simulate {
            tier,
            seed,
            seconds,
            offline,
            config,
            json,
        } => {
            let mut options = SimulationOptions {
                tier: Tier::parse_or_default(&tier),
                seed,
                seconds,
                owner_online: !offline,
                ..SimulationOptions::default()
            };
            if let Some(path) = config {
                match RaidConfig::load(&path) {
                    Ok(loaded) => options.config = loaded,
                    Err(e) => {
                        tracing::error!("{e}");
                        std::process::exit(1);
                    }
                }
            }

            let result = match run_simulation(&options) {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("{e}");
                    std::process::exit(1);
                }
            };
            if json {
                match serde_json::to_string_pretty(&result) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        tracing::error!("Failed to encode result: {e}");
                        std::process::exit(1);
                    }
                }
                return;
            }

            println!("{}", result.message);
            for sample in &result.samples {
                println!(
                    "  t={:>7.1}s  agents={:<3} cosmetics={}",
                    sample.time, sample.active_agents, sample.cosmetics
                );
            }
            println!(
                "expired={} engagements={}",
                result.expired, result.engagements
            );
        }
    }
}
