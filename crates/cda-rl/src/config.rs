//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::error::{RLError, Result};
use crate::optimizer::AdamConfig;

/// Construction-time configuration for the action-selection engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Length of every state vector (D)
    #[serde(default = "default_state_dim")]
    pub state_dim: usize,

    /// Number of discrete actions (A)
    #[serde(default = "default_action_count")]
    pub action_count: usize,

    /// Experience store capacity
    #[serde(default = "default_replay_capacity")]
    pub replay_capacity: usize,

    /// Batch size used by replay training
    #[serde(default = "default_replay_batch_size")]
    pub replay_batch_size: usize,

    /// Adam step size
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// First-moment decay
    #[serde(default = "default_beta1")]
    pub beta1: f64,

    /// Second-moment decay
    #[serde(default = "default_beta2")]
    pub beta2: f64,

    /// Adam denominator stabilizer
    #[serde(default = "default_adam_epsilon")]
    pub adam_epsilon: f64,

    /// Discount factor (gamma)
    #[serde(default = "default_discount")]
    pub discount: f64,

    /// Exploration rate used when the caller does not pass one
    #[serde(default = "default_exploration_rate")]
    pub exploration_rate: f64,

    /// Updates between target syncs, 0 disables step-based syncing
    #[serde(default = "default_target_sync_interval")]
    pub target_sync_interval: u64,

    /// Sync the target table whenever a terminal transition is learned
    #[serde(default = "default_sync_target_on_terminal")]
    pub sync_target_on_terminal: bool,

    /// Seed for the exploration and sampling generator
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_state_dim() -> usize {
    100
}
fn default_action_count() -> usize {
    10
}
fn default_replay_capacity() -> usize {
    10000
}
fn default_replay_batch_size() -> usize {
    32
}
fn default_learning_rate() -> f64 {
    0.001
}
fn default_beta1() -> f64 {
    0.9
}
fn default_beta2() -> f64 {
    0.999
}
fn default_adam_epsilon() -> f64 {
    1e-8
}
fn default_discount() -> f64 {
    0.99
}
fn default_exploration_rate() -> f64 {
    0.1
}
fn default_target_sync_interval() -> u64 {
    100
}
fn default_sync_target_on_terminal() -> bool {
    false
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            state_dim: default_state_dim(),
            action_count: default_action_count(),
            replay_capacity: default_replay_capacity(),
            replay_batch_size: default_replay_batch_size(),
            learning_rate: default_learning_rate(),
            beta1: default_beta1(),
            beta2: default_beta2(),
            adam_epsilon: default_adam_epsilon(),
            discount: default_discount(),
            exploration_rate: default_exploration_rate(),
            target_sync_interval: default_target_sync_interval(),
            sync_target_on_terminal: default_sync_target_on_terminal(),
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Config with the given dimensions and defaults everywhere else
    pub fn with_dims(state_dim: usize, action_count: usize) -> Self {
        Self {
            state_dim,
            action_count,
            ..Self::default()
        }
    }

    /// Optimizer hyperparameters carried by this config
    pub fn adam(&self) -> AdamConfig {
        AdamConfig {
            learning_rate: self.learning_rate,
            beta1: self.beta1,
            beta2: self.beta2,
            epsilon: self.adam_epsilon,
        }
    }

    /// Check every field is in range
    pub fn validate(&self) -> Result<()> {
        if self.state_dim == 0 {
            return Err(RLError::InvalidParameter(
                "state_dim must be positive".to_string(),
            ));
        }
        if self.action_count == 0 {
            return Err(RLError::InvalidParameter(
                "action_count must be positive".to_string(),
            ));
        }
        if self.replay_capacity == 0 {
            return Err(RLError::InvalidParameter(
                "replay_capacity must be positive".to_string(),
            ));
        }
        if self.replay_batch_size == 0 {
            return Err(RLError::InvalidParameter(
                "replay_batch_size must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.discount) {
            return Err(RLError::InvalidParameter(format!(
                "discount must be in [0, 1], got {}",
                self.discount
            )));
        }
        if !(0.0..=1.0).contains(&self.exploration_rate) {
            return Err(RLError::InvalidParameter(format!(
                "exploration_rate must be in [0, 1], got {}",
                self.exploration_rate
            )));
        }
        self.adam().validate()
    }
}
