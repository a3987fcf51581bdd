//! Model training module
//!
//! Gradient boosted trees on the engineered feature matrix, with a seeded
//! train/test split and threshold-based evaluation.

mod config;
mod engine;
mod metrics;
pub mod decision_tree;
pub mod gradient_boosting;

pub use config::{TrainingConfig, DEFAULT_DECISION_THRESHOLD};
pub use engine::TrainEngine;
pub use gradient_boosting::{GradientBoostingClassifier, GradientBoostingConfig};
pub use metrics::ModelMetrics;
pub use decision_tree::RegressionTree;
