//! failsense - Machine failure prediction from sensor telemetry
//!
//! This crate implements the full pipeline from a raw machine-sensor dataset
//! to a served failure prediction:
//! - Fixed input schema with a frozen engineered column order
//! - Feature transformation (standardization + fixed-domain one-hot encoding)
//! - Gradient boosted tree training with seeded reproducibility
//! - Versioned, fingerprinted artifact persistence
//! - Single-row and bulk inference through the persisted transformer state
//!
//! # Modules
//!
//! - [`schema`] - Raw field names, the product-type domain, frozen column order
//! - [`preprocessing`] - Scaler and feature transformer
//! - [`training`] - Gradient boosting classifier, split, metrics
//! - [`artifacts`] - Versioned artifact store
//! - [`inference`] - Prediction engine over loaded artifacts
//! - [`utils`] - CSV loading and cleaning
//! - [`cli`] - Command-line interface and interactive form

// Core error handling
pub mod error;

// Core ML modules
pub mod schema;
pub mod preprocessing;
pub mod training;
pub mod artifacts;
pub mod inference;

// Utilities
pub mod utils;

// Services
pub mod cli;

pub use error::{FailsenseError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{FailsenseError, Result};

    // Schema
    pub use crate::schema::{ProductType, RawRecord};

    // Preprocessing
    pub use crate::preprocessing::{FeatureTransformer, StandardScaler};

    // Training
    pub use crate::training::{
        GradientBoostingClassifier, GradientBoostingConfig, ModelMetrics, TrainEngine,
        TrainingConfig,
    };

    // Artifacts
    pub use crate::artifacts::{ArtifactKind, ArtifactStore};

    // Inference
    pub use crate::inference::{PredictEngine, PredictionLabel, PredictionResult};
}
