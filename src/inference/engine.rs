//! Inference engine implementation
//!
//! Loads the three persisted artifacts, cross-checks their schema
//! fingerprints against the current schema, and scores raw records through
//! the exact transformation the model was trained on. Model and transformer
//! are immutable after load and shared behind `Arc`.

use crate::artifacts::ArtifactStore;
use crate::error::{FailsenseError, Result};
use crate::preprocessing::FeatureTransformer;
use crate::schema::{self, RawRecord};
use crate::training::{GradientBoostingClassifier, DEFAULT_DECISION_THRESHOLD};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Predicted outcome label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionLabel {
    Failure,
    NoFailure,
}

impl PredictionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionLabel::Failure => "Failure",
            PredictionLabel::NoFailure => "No Failure",
        }
    }
}

impl fmt::Display for PredictionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: PredictionLabel,
    /// Probability of failure, in [0, 1]
    pub probability: f64,
}

/// Inference engine over loaded, read-only artifacts
#[derive(Debug, Clone)]
pub struct PredictEngine {
    model: Arc<GradientBoostingClassifier>,
    transformer: Arc<FeatureTransformer>,
    threshold: f64,
}

impl PredictEngine {
    /// Load model and transformer from an artifact store, rejecting artifacts
    /// whose fingerprint does not match the current schema.
    pub fn load(store: &ArtifactStore) -> Result<Self> {
        let expected = schema::schema_fingerprint(&schema::engineered_columns());
        let (model, transformer) = store.load_training(&expected)?;

        info!(root = %store.root().display(), "loaded inference artifacts");
        Ok(Self {
            model: Arc::new(model),
            transformer: Arc::new(transformer),
            threshold: DEFAULT_DECISION_THRESHOLD,
        })
    }

    /// Build directly from fitted parts (used right after training)
    pub fn from_parts(
        model: GradientBoostingClassifier,
        transformer: FeatureTransformer,
    ) -> Result<Self> {
        if !model.is_fitted() || !transformer.is_fitted() {
            return Err(FailsenseError::ModelNotFitted);
        }
        Ok(Self {
            model: Arc::new(model),
            transformer: Arc::new(transformer),
            threshold: DEFAULT_DECISION_THRESHOLD,
        })
    }

    /// Override the decision threshold
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(FailsenseError::InvalidParameter {
                name: "threshold".to_string(),
                value: threshold.to_string(),
                reason: "expected a probability in [0, 1]".to_string(),
            });
        }
        self.threshold = threshold;
        Ok(self)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score a batch of records. Each record is validated, the batch is
    /// rebuilt into the frozen engineered layout, and every row gets a label
    /// plus failure probability.
    pub fn predict(&self, records: &[RawRecord]) -> Result<Vec<PredictionResult>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        for record in records {
            record.validate()?;
        }

        let df = RawRecord::to_dataframe(records)?;
        self.predict_frame(&df)
    }

    /// Score one record through the same path as a batch
    pub fn predict_one(&self, record: &RawRecord) -> Result<PredictionResult> {
        let mut results = self.predict(std::slice::from_ref(record))?;
        results.pop().ok_or_else(|| {
            FailsenseError::InferenceError("no prediction produced".to_string())
        })
    }

    /// Score a raw feature frame (bulk scoring of a loaded CSV)
    pub fn predict_frame(&self, df: &DataFrame) -> Result<Vec<PredictionResult>> {
        let engineered = self.transformer.transform(df)?;
        let x = self.transformer.to_matrix(&engineered)?;
        let probs = self.model.predict_proba(&x)?;

        Ok(probs
            .iter()
            .map(|&p| PredictionResult {
                label: if p >= self.threshold {
                    PredictionLabel::Failure
                } else {
                    PredictionLabel::NoFailure
                },
                probability: p,
            })
            .collect())
    }
}
