//! Synthetic fault-triage simulation
//!
//! Each episode draws a fault class, shows the agent a noisy one-hot
//! observation of it, and rewards the action that fixes that class. Several
//! sessions can run concurrently against one shared engine.

use anyhow::{bail, Context, Result};
use clap::Args;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, Instrument};

use cda_core::SessionId;
use cda_rl::{ActionService, RLError, ServiceStats, Transition};

use crate::config::{Config, SimulationConfig};

const SUCCESS_REWARD: f64 = 1.0;
const FAILURE_REWARD: f64 = -0.1;

#[derive(Args)]
pub struct SimulateArgs {
    /// Total episodes across all sessions
    #[arg(short, long)]
    pub episodes: Option<usize>,

    /// Concurrent debugging sessions
    #[arg(long)]
    pub sessions: Option<usize>,

    /// Seed for both the engine and the environment
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct SessionReport {
    session_id: SessionId,
    episodes: usize,
    solved: usize,
    steps: usize,
    total_reward: f64,
    final_epsilon: f64,
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    episodes: usize,
    solved: usize,
    solve_rate: f64,
    average_steps: f64,
    sessions: Vec<SessionReport>,
    engine: ServiceStats,
}

/// Correct action for a fault class
fn fix_for(fault: usize, action_count: usize) -> usize {
    fault % action_count
}

/// One-hot observation of `fault` with uniform noise on every component
fn observe(rng: &mut StdRng, fault: usize, state_dim: usize, noise: f64) -> Vec<f64> {
    (0..state_dim)
        .map(|i| {
            let base = if i == fault { 1.0 } else { 0.0 };
            if noise > 0.0 {
                base + rng.gen_range(-noise..noise)
            } else {
                base
            }
        })
        .collect()
}

fn validate(sim: &SimulationConfig) -> Result<()> {
    if sim.sessions == 0 || sim.max_steps == 0 {
        bail!("simulation.sessions and simulation.max_steps must be positive");
    }
    for (name, value) in [
        ("epsilon_start", sim.epsilon_start),
        ("epsilon_end", sim.epsilon_end),
        ("epsilon_decay", sim.epsilon_decay),
    ] {
        if !(0.0..=1.0).contains(&value) {
            bail!("simulation.{name} must be in [0, 1], got {value}");
        }
    }
    // Noise at or above 0.5 could let another component outweigh the fault
    if !(0.0..0.5).contains(&sim.state_noise) {
        bail!("simulation.state_noise must be in [0, 0.5), got {}", sim.state_noise);
    }
    Ok(())
}

pub async fn run(args: SimulateArgs, config: &Config) -> Result<()> {
    let mut sim = config.simulation.clone();
    if let Some(episodes) = args.episodes {
        sim.episodes = episodes;
    }
    if let Some(sessions) = args.sessions {
        sim.sessions = sessions;
    }
    validate(&sim)?;

    let mut engine = config.engine.clone();
    if let Some(seed) = args.seed {
        engine.seed = Some(seed);
    }
    let env_seed = engine.seed.unwrap_or_else(rand::random);

    let service = ActionService::new(engine.clone()).context("Failed to build engine")?;
    info!(
        "Simulating {} episodes over {} session(s), state_dim={}, actions={}",
        sim.episodes, sim.sessions, engine.state_dim, engine.action_count
    );

    let mut handles = Vec::with_capacity(sim.sessions);
    for session in 0..sim.sessions {
        let episodes = sim.episodes / sim.sessions + usize::from(session < sim.episodes % sim.sessions);
        let session_id = SessionId::new();
        let rng = StdRng::seed_from_u64(env_seed.wrapping_add(session as u64));
        let span = tracing::info_span!("session", id = %session_id);
        handles.push(tokio::spawn(
            run_session(
                service.clone(),
                sim.clone(),
                session_id,
                episodes,
                rng,
            )
            .instrument(span),
        ));
    }

    let mut sessions = Vec::with_capacity(handles.len());
    for handle in handles {
        sessions.push(handle.await.context("Session task panicked")??);
    }

    let episodes: usize = sessions.iter().map(|s| s.episodes).sum();
    let solved: usize = sessions.iter().map(|s| s.solved).sum();
    let steps: usize = sessions.iter().map(|s| s.steps).sum();
    let report = SimulationReport {
        episodes,
        solved,
        solve_rate: if episodes > 0 { solved as f64 / episodes as f64 } else { 0.0 },
        average_steps: if episodes > 0 { steps as f64 / episodes as f64 } else { 0.0 },
        sessions,
        engine: service.stats().await,
    };

    info!(
        "Simulation complete: solved {}/{} ({:.1}%)",
        report.solved,
        report.episodes,
        report.solve_rate * 100.0
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_session(
    service: ActionService,
    sim: SimulationConfig,
    session_id: SessionId,
    episodes: usize,
    mut rng: StdRng,
) -> Result<SessionReport> {
    let mut report = SessionReport {
        session_id,
        episodes,
        solved: 0,
        steps: 0,
        total_reward: 0.0,
        final_epsilon: sim.epsilon_start,
    };
    let engine = service.config().await;
    let mut epsilon = sim.epsilon_start;
    let mut updates = 0usize;

    for episode in 0..episodes {
        let fault = rng.gen_range(0..engine.state_dim);
        let fix = fix_for(fault, engine.action_count);
        let mut state = observe(&mut rng, fault, engine.state_dim, sim.state_noise);

        for step in 0..sim.max_steps {
            let action = service.select_action(&state, epsilon).await?;
            let index = action
                .index()
                .with_context(|| format!("unexpected action id {}", action.id))?;

            let solved = index == fix;
            let reward = if solved { SUCCESS_REWARD } else { FAILURE_REWARD };
            let terminal = solved || step + 1 == sim.max_steps;
            let next_state = observe(&mut rng, fault, engine.state_dim, sim.state_noise);

            service
                .update(Transition::new(state, index, reward, next_state.clone(), terminal))
                .await?;
            updates += 1;
            report.steps += 1;
            report.total_reward += reward;

            if sim.replay_interval > 0 && updates % sim.replay_interval == 0 {
                match service.replay_default().await {
                    Ok(loss) => debug!(loss, "Replay step"),
                    Err(RLError::EmptyStore) => {}
                    Err(e) => return Err(e.into()),
                }
            }

            if solved {
                report.solved += 1;
            }
            if terminal {
                break;
            }
            state = next_state;
        }

        epsilon = (epsilon * sim.epsilon_decay).max(sim.epsilon_end);
        debug!(episode, fault, epsilon, "Episode finished");
    }

    report.final_epsilon = epsilon;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cda_rl::EngineConfig;

    #[test]
    fn test_observe_keeps_fault_dominant() {
        let mut rng = StdRng::seed_from_u64(1);
        for fault in 0..10 {
            let state = observe(&mut rng, fault, 10, 0.49);
            assert_eq!(cda_core::util::dominant_index(&state), fault);
        }
        assert_eq!(observe(&mut rng, 2, 3, 0.0), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_validate() {
        assert!(validate(&SimulationConfig::default()).is_ok());

        let mut sim = SimulationConfig::default();
        sim.sessions = 0;
        assert!(validate(&sim).is_err());

        let mut sim = SimulationConfig::default();
        sim.state_noise = 0.5;
        assert!(validate(&sim).is_err());

        let mut sim = SimulationConfig::default();
        sim.epsilon_decay = 1.2;
        assert!(validate(&sim).is_err());
    }

    #[tokio::test]
    async fn test_session_solves_small_problem() {
        let mut engine = EngineConfig::with_dims(3, 3);
        engine.seed = Some(9);
        let service = ActionService::new(engine).unwrap();
        let sim = SimulationConfig {
            episodes: 200,
            ..SimulationConfig::default()
        };

        let report = run_session(
            service.clone(),
            sim,
            SessionId::new(),
            200,
            StdRng::seed_from_u64(9),
        )
        .await
        .unwrap();

        assert_eq!(report.episodes, 200);
        // Only heavily exploring early episodes can run out of steps
        assert!(report.solved >= 180);
        assert!(report.final_epsilon < 0.2);
        assert_eq!(service.stats().await.selector.updates as usize, report.steps);
    }
}
