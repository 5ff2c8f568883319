// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Online scalar learner ("neural memory")
//!
//! A linear model over letter-frequency features, trained one message at a
//! time with the delta (Widrow-Hoff) rule:
//!
//! ```text
//! error     = target - w · x
//! w[i]     += learning_rate * error * x[i]
//! ```
//!
//! For a repeated `(text, target)` pair the error shrinks by a factor of
//! `1 - rate * |x|^2` per step. Long messages have large `|x|^2`, so each
//! step uses `rate = min(learning_rate, 1 / |x|^2)`. The factor then stays in
//! `[0, 1)` and the error never grows, whatever the message length.

use tracing::debug;

/// One slot per lowercase ASCII letter
pub const LEARNER_DIMENSION_DEFAULT: usize = 26;

pub const LEARNER_LEARNING_RATE_DEFAULT: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct OnlineScalarLearner {
    weights: Vec<f64>,
    learning_rate: f64,
}

impl OnlineScalarLearner {
    /// Zero-initialised learner
    pub fn new(dimension: usize, learning_rate: f64) -> Self {
        Self {
            weights: vec![0.0; dimension],
            learning_rate,
        }
    }

    /// Restore previously persisted weights. State of the wrong length or
    /// with non-finite entries is treated as "no prior state" and the
    /// learner starts from zeros.
    pub fn with_weights(dimension: usize, learning_rate: f64, stored: Option<Vec<f64>>) -> Self {
        match stored {
            Some(weights) if weights.iter().any(|w| !w.is_finite()) => {
                debug!("Ignoring stored learner weights: non-finite entries");
                Self::new(dimension, learning_rate)
            }
            Some(weights) if weights.len() == dimension => Self {
                weights,
                learning_rate,
            },
            Some(weights) => {
                debug!(
                    "Ignoring stored learner weights: expected {} dimensions, found {}",
                    dimension,
                    weights.len()
                );
                Self::new(dimension, learning_rate)
            }
            None => Self::new(dimension, learning_rate),
        }
    }

    pub fn dimension(&self) -> usize {
        self.weights.len()
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Case-folded a-z counts. Non-letters and letters past the configured
    /// dimension are ignored.
    pub fn vectorize(&self, text: &str) -> Vec<f64> {
        let mut features = vec![0.0; self.weights.len()];
        for c in text.chars().map(|c| c.to_ascii_lowercase()) {
            if c.is_ascii_lowercase() {
                let slot = (c as u8 - b'a') as usize;
                if let Some(count) = features.get_mut(slot) {
                    *count += 1.0;
                }
            }
        }
        features
    }

    pub fn predict(&self, text: &str) -> f64 {
        self.weights
            .iter()
            .zip(self.vectorize(text))
            .map(|(w, x)| w * x)
            .sum()
    }

    /// Single delta-rule step. Returns the error measured before the step.
    pub fn update(&mut self, text: &str, target: f64) -> f64 {
        let features = self.vectorize(text);
        let prediction: f64 = self
            .weights
            .iter()
            .zip(&features)
            .map(|(w, x)| w * x)
            .sum();
        let error = target - prediction;

        let rate = self.step_rate(&features);
        for (weight, x) in self.weights.iter_mut().zip(&features) {
            *weight += rate * error * x;
        }

        error
    }

    /// Configured rate, capped at `1 / |x|^2`
    fn step_rate(&self, features: &[f64]) -> f64 {
        let norm_sq: f64 = features.iter().map(|x| x * x).sum();
        if norm_sq > 0.0 {
            self.learning_rate.min(1.0 / norm_sq)
        } else {
            self.learning_rate
        }
    }
}

impl Default for OnlineScalarLearner {
    fn default() -> Self {
        Self::new(LEARNER_DIMENSION_DEFAULT, LEARNER_LEARNING_RATE_DEFAULT)
    }
}
