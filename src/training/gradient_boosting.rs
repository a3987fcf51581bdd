//! Gradient boosted trees for binary failure classification
//!
//! Native implementation: regression trees fitted on log-loss residuals with
//! seeded row/column subsampling, so a fixed seed reproduces the exact same
//! ensemble on every run.

use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::decision_tree::RegressionTree;
use crate::error::{FailsenseError, Result};

/// Gradient boosting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingConfig {
    /// Number of boosting rounds (trees)
    pub n_estimators: usize,
    /// Learning rate (shrinkage)
    pub learning_rate: f64,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum samples per leaf
    pub min_samples_leaf: usize,
    /// Subsample ratio for each tree
    pub subsample: f64,
    /// Column subsample ratio
    pub colsample_bytree: f64,
    /// Random seed
    pub random_state: Option<u64>,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 6,
            min_samples_leaf: 1,
            subsample: 0.8,
            colsample_bytree: 0.8,
            random_state: Some(42),
        }
    }
}

/// Binary gradient boosting classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingClassifier {
    config: GradientBoostingConfig,
    trees: Vec<RegressionTree>,
    col_indices_per_tree: Vec<Vec<usize>>,
    initial_log_odds: f64,
    feature_importances: Vec<f64>,
}

impl GradientBoostingClassifier {
    pub fn new(config: GradientBoostingConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            col_indices_per_tree: Vec::new(),
            initial_log_odds: 0.0,
            feature_importances: Vec::new(),
        }
    }

    pub fn config(&self) -> &GradientBoostingConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Fit on a binary 0/1 target
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(FailsenseError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if y.iter().any(|&v| v != 0.0 && v != 1.0) {
            return Err(FailsenseError::TrainingError(
                "target must be binary 0/1".to_string(),
            ));
        }

        // Degenerate target: a single class admits no decision boundary.
        let p = y.mean().unwrap_or(0.5);
        if p == 0.0 || p == 1.0 {
            return Err(FailsenseError::TrainingError(
                "target contains a single class; cannot fit a classifier".to_string(),
            ));
        }

        self.initial_log_odds = (p / (1.0 - p)).ln();

        let mut log_odds = Array1::from_elem(n_samples, self.initial_log_odds);

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        self.feature_importances = vec![0.0; n_features];
        self.trees = Vec::with_capacity(self.config.n_estimators);
        self.col_indices_per_tree = Vec::with_capacity(self.config.n_estimators);

        for _ in 0..self.config.n_estimators {
            // Gradient of the log loss
            let residuals: Array1<f64> = if n_samples > 10_000 {
                let lo = &log_odds;
                let res: Vec<f64> = (0..n_samples)
                    .into_par_iter()
                    .map(|i| y[i] - sigmoid(lo[i]))
                    .collect();
                Array1::from_vec(res)
            } else {
                y.iter()
                    .zip(log_odds.iter())
                    .map(|(yi, lo)| yi - sigmoid(*lo))
                    .collect()
            };

            let sample_indices = self.subsample_indices(n_samples, &mut rng);
            let col_indices = self.colsample_indices(n_features, &mut rng);

            let (x_sub, y_sub) =
                subsample_data(x, &residuals, &sample_indices, &col_indices);

            let mut tree = RegressionTree::new()
                .with_max_depth(self.config.max_depth)
                .with_min_samples_leaf(self.config.min_samples_leaf);
            tree.fit(&x_sub, &y_sub)?;

            // Update log odds for every row so the training-time state matches
            // what predict_proba will later accumulate.
            let x_cols = x.select(ndarray::Axis(1), &col_indices);
            let tree_pred = tree.predict(&x_cols)?;
            for i in 0..n_samples {
                log_odds[i] += self.config.learning_rate * tree_pred[i];
            }

            if let Some(tree_importance) = tree.feature_importances() {
                for (j, &col_idx) in col_indices.iter().enumerate() {
                    if j < tree_importance.len() {
                        self.feature_importances[col_idx] += tree_importance[j];
                    }
                }
            }

            self.trees.push(tree);
            self.col_indices_per_tree.push(col_indices);
        }

        let total: f64 = self.feature_importances.iter().sum();
        if total > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= total;
            }
        }

        Ok(())
    }

    /// Probability of the positive (failure) class per row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(FailsenseError::ModelNotFitted);
        }

        let n = x.nrows();
        let mut log_odds = Array1::from_elem(n, self.initial_log_odds);

        for (tree, col_indices) in self.trees.iter().zip(self.col_indices_per_tree.iter()) {
            let x_sub = x.select(ndarray::Axis(1), col_indices);
            let tree_pred = tree.predict(&x_sub)?;
            for i in 0..n {
                log_odds[i] += self.config.learning_rate * tree_pred[i];
            }
        }

        Ok(log_odds.iter().map(|&lo| sigmoid(lo)).collect())
    }

    /// Binary labels at the given decision threshold
    pub fn predict(&self, x: &Array2<f64>, threshold: f64) -> Result<Array1<f64>> {
        let probs = self.predict_proba(x)?;
        Ok(probs
            .iter()
            .map(|&p| if p >= threshold { 1.0 } else { 0.0 })
            .collect())
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    fn subsample_indices(&self, n: usize, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
        sample_indices(n, self.config.subsample, rng)
    }

    fn colsample_indices(&self, n: usize, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
        sample_indices(n, self.config.colsample_bytree, rng)
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn sample_indices(n: usize, ratio: f64, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
    let sample_size = ((n as f64) * ratio).ceil() as usize;
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(sample_size.max(1));
    indices.sort();
    indices
}

fn subsample_data(
    x: &Array2<f64>,
    y: &Array1<f64>,
    row_indices: &[usize],
    col_indices: &[usize],
) -> (Array2<f64>, Array1<f64>) {
    let x_rows = x.select(ndarray::Axis(0), row_indices);
    let x_sub = x_rows.select(ndarray::Axis(1), col_indices);
    let y_sub: Array1<f64> = Array1::from_vec(row_indices.iter().map(|&i| y[i]).collect());
    (x_sub, y_sub)
}
