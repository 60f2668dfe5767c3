//! Command-line entry point for the Pitchside league simulator.
//!
//! Commands:
//!
//! - `serve` -- run the HTTP server
//! - `simulate [--matchdays N]` -- advance N matchdays headless
//! - `test` -- offline self-check on an in-memory store
//!
//! Global flags: `--reset` clears the store, `--seed` overrides the
//! world seed for fresh stores, `--db` sets the database path.
//! Environment: `DB_PATH`, `RESET_DB`, `HOST`, `PORT`, and the
//! `LLM_*` family (see the brain crate). Unknown variables are
//! ignored.
//!
//! Exit codes: 0 ok, 1 runtime error, 2 misconfiguration.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pitchside_brain::{BrainConfig, Collaborator};
use pitchside_core::Orchestrator;
use pitchside_server::AppState;
use pitchside_store::EventStore;

/// Default world seed for fresh stores.
const DEFAULT_SEED: u64 = 42;

/// Default database path.
const DEFAULT_DB_PATH: &str = "pitchside.db";

#[derive(Debug, Parser)]
#[command(name = "pitchside", about = "Event-sourced football league simulator")]
struct Cli {
    /// Clear the event store before starting.
    #[arg(long)]
    reset: bool,

    /// World seed for a fresh store (ignored when a log exists).
    #[arg(long)]
    seed: Option<u64>,

    /// Database path (overrides DB_PATH).
    #[arg(long)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve,
    /// Advance the simulation headless.
    Simulate {
        /// Number of matchdays to play.
        #[arg(long, default_value_t = 1)]
        matchdays: u32,
    },
    /// Offline self-check against an in-memory store.
    Test,
}

/// Errors mapped to exit codes.
#[derive(Debug, thiserror::Error)]
enum CliError {
    /// Exit code 2.
    #[error("configuration error: {0}")]
    Config(String),

    /// Exit code 1.
    #[error("{0}")]
    Runtime(String),
}

impl From<pitchside_core::CoreError> for CliError {
    fn from(err: pitchside_core::CoreError) -> Self {
        Self::Runtime(err.to_string())
    }
}

impl From<pitchside_store::StoreError> for CliError {
    fn from(err: pitchside_store::StoreError) -> Self {
        Self::Runtime(err.to_string())
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Config(message)) => {
            eprintln!("pitchside: configuration error: {message}");
            ExitCode::from(2)
        }
        Err(CliError::Runtime(message)) => {
            eprintln!("pitchside: {message}");
            ExitCode::from(1)
        }
    }
}

#[tokio::main]
async fn run(cli: Cli) -> Result<(), CliError> {
    let brain_config = BrainConfig::from_env().map_err(|e| CliError::Config(e.to_string()))?;
    let collaborator = Collaborator::from_config(&brain_config);
    info!(backend = collaborator.name(), "collaborator ready");

    let seed = cli.seed.unwrap_or(DEFAULT_SEED);
    let reset = cli.reset || env_truthy("RESET_DB");

    match cli.command {
        Command::Test => {
            // The self-check always runs on a throwaway in-memory store.
            let store = EventStore::in_memory().await?;
            let mut orchestrator =
                Orchestrator::bootstrap(store, collaborator, brain_config.timeout, seed).await?;
            let summary = orchestrator.advance().await?;
            if summary.matches_played == 0 {
                return Err(CliError::Runtime(String::from(
                    "self-check played no matches",
                )));
            }
            println!(
                "self-check ok: {} matches, {} events, season {}",
                summary.matches_played, summary.events_appended, summary.season
            );
            Ok(())
        }
        Command::Simulate { matchdays } => {
            let store = open_store(&cli.db, reset).await?;
            let mut orchestrator =
                Orchestrator::bootstrap(store, collaborator, brain_config.timeout, seed).await?;
            for day in 1..=matchdays {
                let summary = orchestrator.advance().await?;
                println!(
                    "matchday {day}: {:?}, {} matches, {} events, season {}",
                    summary.status, summary.matches_played, summary.events_appended, summary.season
                );
            }
            Ok(())
        }
        Command::Serve => {
            let store = open_store(&cli.db, reset).await?;
            let orchestrator =
                Orchestrator::bootstrap(store, collaborator, brain_config.timeout, seed).await?;
            let state = AppState::new(orchestrator);

            let host = std::env::var("HOST").unwrap_or_else(|_| String::from("127.0.0.1"));
            let port: u16 = match std::env::var("PORT") {
                Ok(raw) => raw
                    .parse()
                    .map_err(|_| CliError::Config(format!("bad PORT: {raw}")))?,
                Err(_) => 8000,
            };
            pitchside_server::serve(Arc::clone(&state), &host, port)
                .await
                .map_err(|e| CliError::Runtime(e.to_string()))
        }
    }
}

/// Open (and optionally reset) the configured store.
async fn open_store(db_flag: &Option<String>, reset: bool) -> Result<EventStore, CliError> {
    let path = db_flag
        .clone()
        .or_else(|| std::env::var("DB_PATH").ok())
        .unwrap_or_else(|| String::from(DEFAULT_DB_PATH));
    let store = EventStore::open(&path).await?;
    if reset {
        store.reset().await?;
        info!(path = %path, "event store reset");
    }
    Ok(store)
}

/// Interpret common truthy spellings of an environment flag.
fn env_truthy(name: &str) -> bool {
    std::env::var(name)
        .map(|raw| matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
