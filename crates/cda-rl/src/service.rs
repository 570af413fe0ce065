//! Action service - async, lock-guarded access for concurrent sessions
//!
//! The whole selector (tables, optimizer state, store, and allocator) sits
//! behind one lock, so selections, updates, and target syncs are atomic with
//! respect to each other.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use cda_core::{Action, Transition};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::selector::{ActionSelector, SelectorStats, UpdateOutcome};

/// Service statistics
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    #[serde(flatten)]
    pub selector: SelectorStats,
    pub started_at: DateTime<Utc>,
    pub last_target_sync: Option<DateTime<Utc>>,
}

struct Inner {
    selector: ActionSelector<StdRng>,
    last_target_sync: Option<DateTime<Utc>>,
}

/// Shared handle to one action selector
#[derive(Clone)]
pub struct ActionService {
    inner: Arc<RwLock<Inner>>,
    started_at: DateTime<Utc>,
}

impl ActionService {
    /// Build a service around a selector created from `config`
    pub fn new(config: EngineConfig) -> Result<Self> {
        Ok(Self::from_selector(ActionSelector::from_config(config)?))
    }

    /// Wrap an existing selector
    pub fn from_selector(selector: ActionSelector<StdRng>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                selector,
                last_target_sync: None,
            })),
            started_at: Utc::now(),
        }
    }

    /// Pick an action, exploring with probability `epsilon`
    pub async fn select_action(&self, state: &[f64], epsilon: f64) -> Result<Action> {
        let mut inner = self.inner.write().await;
        inner.selector.select_action(state, epsilon)
    }

    /// Learn from one transition
    pub async fn update(&self, transition: Transition) -> Result<UpdateOutcome> {
        let mut inner = self.inner.write().await;
        let outcome = inner.selector.update(transition)?;
        if outcome.synced {
            inner.last_target_sync = Some(Utc::now());
        }
        Ok(outcome)
    }

    /// Re-learn a sampled batch from the replay store
    pub async fn replay(&self, batch_size: usize) -> Result<f64> {
        let mut inner = self.inner.write().await;
        inner.selector.replay(batch_size)
    }

    /// Replay with the configured batch size
    pub async fn replay_default(&self) -> Result<f64> {
        let mut inner = self.inner.write().await;
        inner.selector.replay_default()
    }

    /// Refresh the target table, e.g. at an episode boundary
    pub async fn sync_target(&self) {
        let mut inner = self.inner.write().await;
        inner.selector.sync_target();
        inner.last_target_sync = Some(Utc::now());
        debug!("Target sync requested by caller");
    }

    /// Online scores for `state`
    pub async fn evaluate(&self, state: &[f64]) -> Result<Vec<f64>> {
        let inner = self.inner.read().await;
        inner.selector.estimator().evaluate(state)
    }

    /// Target scores for `state`
    pub async fn evaluate_target(&self, state: &[f64]) -> Result<Vec<f64>> {
        let inner = self.inner.read().await;
        inner.selector.estimator().evaluate_target(state)
    }

    /// Get current statistics
    pub async fn stats(&self) -> ServiceStats {
        let inner = self.inner.read().await;
        ServiceStats {
            selector: inner.selector.stats(),
            started_at: self.started_at,
            last_target_sync: inner.last_target_sync,
        }
    }

    /// Engine configuration
    pub async fn config(&self) -> EngineConfig {
        self.inner.read().await.selector.config().clone()
    }
}
