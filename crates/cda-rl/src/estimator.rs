//! Value estimator with online and target tables
//!
//! Both tables are `state_dim × action_count` matrices. A state is projected
//! onto its active row, the index of its largest-magnitude component, and the
//! row holds one score per action. For one-hot states this is exactly
//! `Qᵀ·s`.

use ndarray::Array2;

use cda_core::util::dominant_index;

use crate::error::{RLError, Result};

/// Online and target value tables
#[derive(Debug, Clone)]
pub struct ValueEstimator {
    online: Array2<f64>,
    target: Array2<f64>,
}

impl ValueEstimator {
    /// Create zero-initialized tables
    pub fn new(state_dim: usize, action_count: usize) -> Self {
        Self {
            online: Array2::zeros((state_dim, action_count)),
            target: Array2::zeros((state_dim, action_count)),
        }
    }

    pub fn state_dim(&self) -> usize {
        self.online.nrows()
    }

    pub fn action_count(&self) -> usize {
        self.online.ncols()
    }

    /// Table row a state is projected onto
    pub fn active_row(&self, state: &[f64]) -> Result<usize> {
        if state.len() != self.state_dim() {
            return Err(RLError::DimensionMismatch {
                expected: self.state_dim(),
                actual: state.len(),
            });
        }
        Ok(dominant_index(state))
    }

    /// Per-action scores of the online table
    pub fn evaluate(&self, state: &[f64]) -> Result<Vec<f64>> {
        let row = self.active_row(state)?;
        Ok(self.online.row(row).to_vec())
    }

    /// Per-action scores of the target table
    pub fn evaluate_target(&self, state: &[f64]) -> Result<Vec<f64>> {
        let row = self.active_row(state)?;
        Ok(self.target.row(row).to_vec())
    }

    /// Index and value of the highest score; the lowest index wins ties.
    ///
    /// NaN scores never beat a number, but a leading NaN is kept when every
    /// later score is NaN too.
    pub fn best_action(scores: &[f64]) -> Option<(usize, f64)> {
        let (&first, rest) = scores.split_first()?;
        let mut best = (0, first);
        for (i, &score) in rest.iter().enumerate() {
            if score > best.1 || (best.1.is_nan() && !score.is_nan()) {
                best = (i + 1, score);
            }
        }
        Some(best)
    }

    /// Online value of `action` in `state`
    pub fn value(&self, state: &[f64], action: usize) -> Result<f64> {
        let row = self.active_row(state)?;
        self.check_action(action)?;
        Ok(self.online[[row, action]])
    }

    /// Overwrite the online value of `action` in `state`
    pub fn set_value(&mut self, state: &[f64], action: usize, value: f64) -> Result<()> {
        let row = self.active_row(state)?;
        self.check_action(action)?;
        self.online[[row, action]] = value;
        Ok(())
    }

    fn check_action(&self, action: usize) -> Result<()> {
        if action >= self.action_count() {
            return Err(RLError::InvalidAction {
                action,
                action_count: self.action_count(),
            });
        }
        Ok(())
    }

    /// Copy the online table into the target table
    pub fn sync_target(&mut self) {
        self.target.assign(&self.online);
    }

    pub fn online(&self) -> &Array2<f64> {
        &self.online
    }

    pub fn online_mut(&mut self) -> &mut Array2<f64> {
        &mut self.online
    }

    pub fn target(&self) -> &Array2<f64> {
        &self.target
    }
}
