//! Action selector - epsilon-greedy policy over the value estimator
//!
//! Owns the estimator, optimizer, and experience store as one aggregate.
//! `select_action` picks an action, `update` learns from one transition,
//! and `replay` re-learns a sampled batch from the store.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use cda_core::{Action, SelectionMode, Transition};

use crate::config::EngineConfig;
use crate::error::{RLError, Result};
use crate::estimator::ValueEstimator;
use crate::experience::ExperienceStore;
use crate::optimizer::AdamOptimizer;

/// Result of learning from one transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UpdateOutcome {
    /// Temporal-difference target written into the online table
    pub target: f64,
    /// Absolute TD error before the write
    pub loss: f64,
    /// Whether the target table was refreshed by this update
    pub synced: bool,
}

/// Selector statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct SelectorStats {
    pub selections: u64,
    pub explorations: u64,
    pub updates: u64,
    pub total_reward: f64,
    pub average_reward: f64,
    pub target_syncs: u64,
    pub buffer_size: usize,
    pub optimizer_steps: u64,
}

/// Epsilon-greedy action selector
pub struct ActionSelector<R = StdRng> {
    config: EngineConfig,
    estimator: ValueEstimator,
    optimizer: AdamOptimizer,
    store: ExperienceStore,
    rng: R,
    updates_since_sync: u64,
    stats: SelectorStats,
}

impl ActionSelector<StdRng> {
    /// Create a selector with a generator seeded from `seed`
    pub fn from_seed(config: EngineConfig, seed: u64) -> Result<Self> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    /// Create a selector using `config.seed`, or OS entropy when unset
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(config, rng)
    }
}

impl<R: Rng> ActionSelector<R> {
    /// Create a selector drawing exploration and sampling randomness from `rng`
    pub fn new(config: EngineConfig, rng: R) -> Result<Self> {
        config.validate()?;

        let estimator = ValueEstimator::new(config.state_dim, config.action_count);
        let optimizer = AdamOptimizer::new(config.adam());
        let store = ExperienceStore::new(config.replay_capacity, config.state_dim)?;

        info!(
            "Action selector initialized: state_dim={}, actions={}, replay_capacity={}",
            config.state_dim, config.action_count, config.replay_capacity
        );

        Ok(Self {
            config,
            estimator,
            optimizer,
            store,
            rng,
            updates_since_sync: 0,
            stats: SelectorStats::default(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn estimator(&self) -> &ValueEstimator {
        &self.estimator
    }

    pub fn estimator_mut(&mut self) -> &mut ValueEstimator {
        &mut self.estimator
    }

    pub fn store(&self) -> &ExperienceStore {
        &self.store
    }

    pub fn optimizer(&self) -> &AdamOptimizer {
        &self.optimizer
    }

    /// Pick an action for `state`, exploring with probability `epsilon`
    pub fn select_action(&mut self, state: &[f64], epsilon: f64) -> Result<Action> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(RLError::InvalidParameter(format!(
                "epsilon must be in [0, 1], got {epsilon}"
            )));
        }
        let scores = self.estimator.evaluate(state)?;

        let (index, mode) = if self.rng.gen::<f64>() < epsilon {
            (
                self.rng.gen_range(0..self.config.action_count),
                SelectionMode::Explore,
            )
        } else {
            let (best, _) = ValueEstimator::best_action(&scores).ok_or_else(|| {
                RLError::InvalidParameter("action space is empty".to_string())
            })?;
            (best, SelectionMode::Exploit)
        };

        self.stats.selections += 1;
        if mode == SelectionMode::Explore {
            self.stats.explorations += 1;
        }
        debug!(action = index, %mode, epsilon, "Selected action");

        Ok(Action::from_index(index, mode).with_parameters(vec![scores[index]]))
    }

    /// Pick an action with the configured exploration rate
    pub fn select_default(&mut self, state: &[f64]) -> Result<Action> {
        self.select_action(state, self.config.exploration_rate)
    }

    /// Learn from one transition and retain it for replay
    pub fn update(&mut self, transition: Transition) -> Result<UpdateOutcome> {
        self.check_transition(&transition)?;
        self.store.add(transition.clone())?;

        let (target, loss) = self.learn(&transition)?;

        self.stats.updates += 1;
        self.stats.total_reward += transition.reward;
        self.updates_since_sync += 1;

        let interval_due = self.config.target_sync_interval > 0
            && self.updates_since_sync >= self.config.target_sync_interval;
        let episode_end = transition.terminal && self.config.sync_target_on_terminal;
        let synced = interval_due || episode_end;
        if synced {
            self.sync_target();
        }

        debug!(
            action = transition.action,
            reward = transition.reward,
            target,
            loss,
            synced,
            "Update complete"
        );

        Ok(UpdateOutcome {
            target,
            loss,
            synced,
        })
    }

    /// Re-learn a uniformly sampled batch from the store; returns mean loss
    pub fn replay(&mut self, batch_size: usize) -> Result<f64> {
        if batch_size == 0 {
            return Err(RLError::InvalidParameter(
                "batch_size must be positive".to_string(),
            ));
        }

        let batch = self.store.sample(batch_size, &mut self.rng)?;
        let mut total_loss = 0.0;
        for transition in &batch {
            let (_, loss) = self.learn(transition)?;
            total_loss += loss;
        }

        let mean_loss = total_loss / batch.len() as f64;
        debug!("Replay step complete, batch: {}, loss: {:.4}", batch.len(), mean_loss);
        Ok(mean_loss)
    }

    /// Replay with the configured batch size
    pub fn replay_default(&mut self) -> Result<f64> {
        self.replay(self.config.replay_batch_size)
    }

    /// Copy the online table into the target table
    pub fn sync_target(&mut self) {
        self.estimator.sync_target();
        self.updates_since_sync = 0;
        self.stats.target_syncs += 1;
        info!("Target table synced (sync #{})", self.stats.target_syncs);
    }

    pub fn stats(&self) -> SelectorStats {
        SelectorStats {
            average_reward: if self.stats.updates > 0 {
                self.stats.total_reward / self.stats.updates as f64
            } else {
                0.0
            },
            buffer_size: self.store.len(),
            optimizer_steps: self.optimizer.timestep(),
            ..self.stats.clone()
        }
    }

    fn check_transition(&self, transition: &Transition) -> Result<()> {
        for vector in [&transition.state, &transition.next_state] {
            if vector.len() != self.config.state_dim {
                return Err(RLError::DimensionMismatch {
                    expected: self.config.state_dim,
                    actual: vector.len(),
                });
            }
        }
        if transition.action >= self.config.action_count {
            return Err(RLError::InvalidAction {
                action: transition.action,
                action_count: self.config.action_count,
            });
        }
        Ok(())
    }

    /// TD write plus optimizer step; returns (target, loss)
    fn learn(&mut self, transition: &Transition) -> Result<(f64, f64)> {
        let target = if transition.terminal {
            transition.reward
        } else {
            let next = self.estimator.evaluate_target(&transition.next_state)?;
            let (_, max_next) = ValueEstimator::best_action(&next).ok_or_else(|| {
                RLError::InvalidParameter("action space is empty".to_string())
            })?;
            transition.reward + self.config.discount * max_next
        };

        let current = self.estimator.value(&transition.state, transition.action)?;
        let loss = (target - current).abs();
        if !loss.is_finite() {
            warn!(target, current, "Non-finite TD loss");
        }

        self.estimator
            .set_value(&transition.state, transition.action, target)?;
        self.optimizer.step(self.estimator.online_mut(), loss)?;

        Ok((target, loss))
    }
}
