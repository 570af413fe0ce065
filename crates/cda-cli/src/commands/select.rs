//! Action selection command

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use cda_core::util::parse_state_vector;
use cda_rl::{ActionSelector, Transition};

use crate::config::Config;

#[derive(Args)]
pub struct SelectArgs {
    /// State vector, comma separated (e.g. "1,0,0")
    #[arg(short, long)]
    pub state: String,

    /// Exploration rate; defaults to engine.exploration_rate
    #[arg(short, long)]
    pub epsilon: Option<f64>,

    /// JSON-lines file of transitions to learn from before selecting
    #[arg(short, long)]
    pub transitions: Option<PathBuf>,
}

pub async fn run(args: SelectArgs, config: &Config) -> Result<()> {
    let state = parse_state_vector(&args.state)?;
    let mut selector = ActionSelector::from_config(config.engine.clone())?;

    if let Some(path) = &args.transitions {
        let learned = warm_start(&mut selector, path)?;
        info!("Learned from {} transitions in {}", learned, path.display());
    }

    let action = match args.epsilon {
        Some(epsilon) => selector.select_action(&state, epsilon),
        None => selector.select_default(&state),
    }
    .context("Action selection failed")?;

    println!("{}", serde_json::to_string_pretty(&action)?);
    Ok(())
}

/// Apply every transition in a JSON-lines file; blank lines are skipped
fn warm_start(selector: &mut ActionSelector, path: &Path) -> Result<usize> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut learned = 0;
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let transition: Transition = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid transition", path.display(), line_no + 1))?;
        selector
            .update(transition)
            .with_context(|| format!("{}:{}: update rejected", path.display(), line_no + 1))?;
        learned += 1;
    }
    Ok(learned)
}
