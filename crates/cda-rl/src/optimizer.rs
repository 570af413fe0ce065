//! Adam optimizer over value tables
//!
//! Keeps bias-corrected first and second moment estimates per parameter.
//! Moments are allocated lazily on the first step and are bound to that
//! table shape from then on.

use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

use crate::error::{RLError, Result};

/// Adam hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdamConfig {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

impl AdamConfig {
    pub fn validate(&self) -> Result<()> {
        if self.learning_rate.is_nan() || self.learning_rate <= 0.0 {
            return Err(RLError::InvalidParameter(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        for (name, beta) in [("beta1", self.beta1), ("beta2", self.beta2)] {
            if !(0.0..1.0).contains(&beta) {
                return Err(RLError::InvalidParameter(format!(
                    "{name} must be in [0, 1), got {beta}"
                )));
            }
        }
        if self.epsilon.is_nan() || self.epsilon <= 0.0 {
            return Err(RLError::InvalidParameter(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Moments {
    m: Array2<f64>,
    v: Array2<f64>,
}

/// Adam optimizer state
#[derive(Debug, Clone)]
pub struct AdamOptimizer {
    config: AdamConfig,
    moments: Option<Moments>,
    t: u64,
}

impl AdamOptimizer {
    pub fn new(config: AdamConfig) -> Self {
        Self {
            config,
            moments: None,
            t: 0,
        }
    }

    pub fn config(&self) -> &AdamConfig {
        &self.config
    }

    /// Number of steps applied so far
    pub fn timestep(&self) -> u64 {
        self.t
    }

    /// Drop the moment estimates and restart the step counter
    pub fn reset(&mut self) {
        self.moments = None;
        self.t = 0;
    }

    /// Step with a scalar loss signal broadcast over the table.
    ///
    /// The gradient of each parameter is `signal * θ`, so a positive signal
    /// pulls every weight toward zero in proportion to its size.
    pub fn step(&mut self, table: &mut Array2<f64>, signal: f64) -> Result<()> {
        let gradients = table.mapv(|theta| signal * theta);
        self.step_with_gradients(table, &gradients)
    }

    /// Step with an explicit gradient for every parameter
    pub fn step_with_gradients(
        &mut self,
        table: &mut Array2<f64>,
        gradients: &Array2<f64>,
    ) -> Result<()> {
        check_shape(table.dim(), gradients.dim())?;
        if let Some(moments) = &self.moments {
            check_shape(moments.m.dim(), table.dim())?;
        }

        let moments = self.moments.get_or_insert_with(|| Moments {
            m: Array2::zeros(table.dim()),
            v: Array2::zeros(table.dim()),
        });
        self.t += 1;

        let AdamConfig {
            learning_rate,
            beta1,
            beta2,
            epsilon,
        } = self.config;
        let t = i32::try_from(self.t).unwrap_or(i32::MAX);
        let m_correction = 1.0 - beta1.powi(t);
        let v_correction = 1.0 - beta2.powi(t);

        Zip::from(table)
            .and(&mut moments.m)
            .and(&mut moments.v)
            .and(gradients)
            .for_each(|theta, m, v, &g| {
                *m = beta1 * *m + (1.0 - beta1) * g;
                *v = beta2 * *v + (1.0 - beta2) * g * g;
                let m_hat = *m / m_correction;
                let v_hat = *v / v_correction;
                *theta -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
            });

        Ok(())
    }
}

impl Default for AdamOptimizer {
    fn default() -> Self {
        Self::new(AdamConfig::default())
    }
}

fn check_shape(expected: (usize, usize), actual: (usize, usize)) -> Result<()> {
    if expected.0 != actual.0 {
        return Err(RLError::DimensionMismatch {
            expected: expected.0,
            actual: actual.0,
        });
    }
    if expected.1 != actual.1 {
        return Err(RLError::DimensionMismatch {
            expected: expected.1,
            actual: actual.1,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_first_step_moves_by_learning_rate() {
        let mut optimizer = AdamOptimizer::new(AdamConfig {
            learning_rate: 0.01,
            ..AdamConfig::default()
        });
        let mut weights = array![[1.0, 2.0], [3.0, 4.0]];

        optimizer.step(&mut weights, 0.5).unwrap();

        // With bias correction the first step is ~lr * sign(g) for every weight
        assert_eq!(optimizer.timestep(), 1);
        for (&after, before) in weights.iter().zip([1.0, 2.0, 3.0, 4.0]) {
            assert!((before - after - 0.01).abs() < 1e-6);
        }
    }

    #[test]
    fn test_zero_weights_stay_put() {
        let mut optimizer = AdamOptimizer::default();
        let mut weights = Array2::zeros((2, 3));

        optimizer.step(&mut weights, 1.0).unwrap();
        assert!(weights.iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_repeated_steps_oppose_gradient() {
        let mut optimizer = AdamOptimizer::default();
        let mut weights = array![[0.5, -0.5]];
        let mut previous = weights.clone();

        for _ in 0..50 {
            optimizer.step(&mut weights, 1.0).unwrap();
            // Positive weight has positive gradient and falls; negative rises
            assert!(weights[[0, 0]] < previous[[0, 0]]);
            assert!(weights[[0, 1]] > previous[[0, 1]]);
            assert!(weights[[0, 0]].abs() < previous[[0, 0]].abs());
            previous = weights.clone();
        }
        assert_eq!(optimizer.timestep(), 50);
    }

    #[test]
    fn test_explicit_gradients() {
        let mut optimizer = AdamOptimizer::default();
        let mut weights = array![[0.0, 0.0]];
        let gradients = array![[1.0, -2.0]];

        optimizer.step_with_gradients(&mut weights, &gradients).unwrap();
        assert!((weights[[0, 0]] + 0.001).abs() < 1e-6);
        assert!((weights[[0, 1]] - 0.001).abs() < 1e-6);
    }

    #[test]
    fn test_shape_change_fails() {
        let mut optimizer = AdamOptimizer::default();
        let mut small = Array2::ones((2, 2));
        let mut wide = Array2::ones((2, 3));

        optimizer.step(&mut small, 1.0).unwrap();
        assert_eq!(
            optimizer.step(&mut wide, 1.0),
            Err(RLError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
        // Failed calls do not advance the counter or touch the table
        assert_eq!(optimizer.timestep(), 1);
        assert!(wide.iter().all(|&w| w == 1.0));

        optimizer.reset();
        assert!(optimizer.step(&mut wide, 1.0).is_ok());
    }

    #[test]
    fn test_gradient_shape_mismatch() {
        let mut optimizer = AdamOptimizer::default();
        let mut weights = Array2::ones((2, 2));
        let gradients = Array2::ones((3, 2));
        assert_eq!(
            optimizer.step_with_gradients(&mut weights, &gradients),
            Err(RLError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_nan_propagates() {
        let mut optimizer = AdamOptimizer::default();
        let mut weights = array![[1.0, 2.0]];
        optimizer.step(&mut weights, f64::NAN).unwrap();
        assert!(weights.iter().all(|w| w.is_nan()));
    }

    #[test]
    fn test_config_validation() {
        assert!(AdamConfig::default().validate().is_ok());
        let bad = AdamConfig {
            learning_rate: 0.0,
            ..AdamConfig::default()
        };
        assert!(bad.validate().is_err());
        let bad = AdamConfig {
            beta2: 1.0,
            ..AdamConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
