use clap::{Args, Parser, Subcommand};
use pokemon_battle_guess::battle::AiDifficulty;
use pokemon_battle_guess::builder::MovesetPolicy;
use pokemon_battle_guess::config::AppConfig;
use pokemon_battle_guess::service::{BattleOptions, SimulateRequest};
use pokemon_battle_guess::{build_service, serve};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
struct CommandArgs {
    /// TOML config file; built-in defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run the HTTP API
    Serve(ServeArg),
    /// Simulate one matchup and print the result as JSON
    Simulate(SimulateArg),
}

#[derive(Debug, Clone, Default, Args)]
struct ServeArg {
    /// Override server.bind_address
    #[arg(long)]
    bind: Option<String>,
    /// Override server.port
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Debug, Clone, Args)]
struct SimulateArg {
    /// Catalog id of creature 1
    pokemon1: u32,
    /// Catalog id of creature 2
    pokemon2: u32,
    #[arg(long)]
    level1: Option<u8>,
    #[arg(long)]
    level2: Option<u8>,
    #[arg(long)]
    with_items: bool,
    #[arg(long, value_enum, default_value_t = MovesetPolicy::Random)]
    moveset: MovesetPolicy,
    #[arg(long, value_enum, default_value_t = AiDifficulty::Random)]
    ai: AiDifficulty,
    #[arg(long)]
    generation: Option<u8>,
    /// Fixed session seed, for reproducible output
    #[arg(long)]
    seed: Option<u64>,
    /// Override simulation.trial_count
    #[arg(long)]
    trials: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = CommandArgs::parse();
    let mut config = AppConfig::load(args.config.as_deref())?;

    match args.mode.unwrap_or(Mode::Serve(ServeArg::default())) {
        Mode::Serve(arg) => {
            if let Some(bind) = arg.bind {
                config.server.bind_address = bind;
            }
            if let Some(port) = arg.port {
                config.server.port = port;
            }
            config.validate()?;
            let service = build_service(&config)?;
            serve(&config, service, shutdown_signal()).await?;
            info!("Server stopped");
        }
        Mode::Simulate(arg) => {
            if arg.seed.is_some() {
                config.simulation.seed = arg.seed;
            }
            if let Some(trials) = arg.trials {
                config.simulation.trial_count = trials;
            }
            config.validate()?;
            let service = build_service(&config)?;
            let request = SimulateRequest {
                pokemon1_id: arg.pokemon1,
                pokemon2_id: arg.pokemon2,
                options: BattleOptions {
                    generation: arg.generation,
                    pokemon1_level: arg.level1,
                    pokemon2_level: arg.level2,
                    with_items: arg.with_items,
                    moveset_type: arg.moveset,
                    ai_difficulty: arg.ai,
                },
            };
            let response = service.simulate_battle(&request).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
