//! Training configuration

use crate::schema::TARGET_COLUMN;
use serde::{Deserialize, Serialize};

use super::gradient_boosting::GradientBoostingConfig;

/// Default decision threshold. Deliberately above 0.5: an unnecessary
/// maintenance stop is cheaper than a missed failure, so positives are only
/// declared at high confidence.
pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.7;

/// Configuration for a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Target column name
    pub target_column: String,

    /// Held-out test fraction
    pub test_split: f64,

    /// Random seed for the split and the booster
    pub random_state: Option<u64>,

    /// Decision threshold for binary metrics
    pub decision_threshold: f64,

    /// Booster hyperparameters
    pub booster: GradientBoostingConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            target_column: TARGET_COLUMN.to_string(),
            test_split: 0.2,
            random_state: Some(42),
            decision_threshold: DEFAULT_DECISION_THRESHOLD,
            booster: GradientBoostingConfig::default(),
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the decision threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.decision_threshold = threshold;
        self
    }

    /// Builder method to set the random seed (also seeds the booster)
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self.booster.random_state = Some(seed);
        self
    }

    /// Builder method to set the test fraction
    pub fn with_test_split(mut self, fraction: f64) -> Self {
        self.test_split = fraction;
        self
    }

    /// Builder method to set the number of boosting rounds
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.booster.n_estimators = n;
        self
    }
}
