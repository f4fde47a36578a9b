//! Celereum Staking - ledger replay tool
//!
//! Usage:
//!   celereum-staking --help

use std::path::PathBuf;
use std::process::ExitCode;

use celereum_staking::{
    replay::{load_script, LedgerConfig, ReplayError, Replayer},
    StakingParams, CELEREUM_STAKING_VERSION,
};
use clap::{Parser, Subcommand};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "celereum-staking")]
#[command(author = "Celereum Team")]
#[command(version = CELEREUM_STAKING_VERSION)]
#[command(about = "Celereum era-indexed staking ledger", long_about = None)]
struct Cli {
    /// Log ledger activity at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default staking parameters
    Params,

    /// Run a script of staking operations against a fresh ledger
    Replay {
        /// Ledger configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Operation list (JSON)
        #[arg(short, long)]
        script: PathBuf,

        /// Write a bincode snapshot of the final ledger here
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the event stream
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let result = match cli.command {
        Commands::Params => print_params(),
        Commands::Replay { config, script, snapshot } => run_replay(config, script, snapshot),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_params() -> Result<(), ReplayError> {
    println!("{}", serde_json::to_string_pretty(&StakingParams::default())?);
    Ok(())
}

fn run_replay(
    config_path: Option<PathBuf>,
    script_path: PathBuf,
    snapshot_path: Option<PathBuf>,
) -> Result<(), ReplayError> {
    let config = match config_path {
        Some(path) => LedgerConfig::load(path)?,
        None => LedgerConfig::default(),
    };
    info!("Celereum staking v{}", CELEREUM_STAKING_VERSION);
    info!("Parameters: {:?}", config.params);

    let script = load_script(&script_path)?;
    let mut replayer = Replayer::new(config)?;
    let events = replayer.run(&script)?;

    for event in &events {
        println!("{}", serde_json::to_string(event)?);
    }

    let ledger = replayer.ledger();
    info!(
        "Replayed {} operations: {} events, {} runners",
        script.len(),
        events.len(),
        ledger.runners().len()
    );

    if let Some(path) = snapshot_path {
        let bytes = ledger.snapshot()?;
        std::fs::write(&path, bytes)?;
        info!("Snapshot written to {}", path.display());
    }
    Ok(())
}
