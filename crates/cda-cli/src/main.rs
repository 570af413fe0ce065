//! CDA CLI - Command line interface for the action-selection engine
//!
//! The engine is normally embedded in the debugging pipeline. This CLI is
//! for inspecting configuration, probing selections, and running the
//! synthetic fault-triage simulation.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unused_async)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::cast_precision_loss)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use crate::commands::{select, simulate};
use crate::config::Config;

#[derive(Parser)]
#[command(name = "cda")]
#[command(author, version, about = "CDA - debugging agent action-selection engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a configuration file
    #[arg(short, long, global = true, env = "CDA_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Select an action for a state vector
    Select(select::SelectArgs),

    /// Run the synthetic fault-triage simulation
    Simulate(simulate::SimulateArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(commands::config::ConfigCommands),
}

fn init_tracing(config: &Config, verbose: bool) {
    let log_level = if verbose { "debug" } else { config.log.level.as_str() };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("cda={log_level},cda_cli={log_level},cda_rl={log_level}").into());

    if config.log.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    init_tracing(&config, cli.verbose);

    match cli.command {
        Commands::Select(args) => select::run(args, &config).await,
        Commands::Simulate(args) => simulate::run(args, &config).await,
        Commands::Config(cmd) => commands::config::run(cmd, &config).await,
    }
}
