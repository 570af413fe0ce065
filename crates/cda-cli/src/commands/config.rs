//! Configuration management commands

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::Config;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a configuration file with default values
    Init {
        /// Destination file
        #[arg(default_value = "cda.toml")]
        path: String,
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

pub async fn run(cmd: ConfigCommands, config: &Config) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show(config).await,
        ConfigCommands::Init { path, force } => init(&path, force).await,
    }
}

async fn show(config: &Config) -> Result<()> {
    println!("# Effective configuration (file, then CDA__ environment overrides)\n");
    println!("{}", config.to_toml()?);
    Ok(())
}

async fn init(path: &str, force: bool) -> Result<()> {
    if Path::new(path).exists() && !force {
        println!("Configuration file already exists: {path}");
        println!("Use --force to overwrite");
        return Ok(());
    }

    let rendered = Config::default().to_toml()?;
    std::fs::write(path, rendered).with_context(|| format!("Failed to write {path}"))?;
    println!("Configuration written to {path}");
    Ok(())
}
