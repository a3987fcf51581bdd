//! Error types for the failsense crate

use thiserror::Error;

/// Result type alias for failsense operations
pub type Result<T> = std::result::Result<T, FailsenseError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum FailsenseError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unknown product type: {0} (expected one of L, M, H)")]
    UnknownProductType(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Artifact error: {0}")]
    ArtifactError(String),

    #[error("Schema mismatch: artifact was written for a different feature schema ({detail})")]
    SchemaMismatch { detail: String },

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for FailsenseError {
    fn from(err: polars::error::PolarsError) -> Self {
        FailsenseError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for FailsenseError {
    fn from(err: serde_json::Error) -> Self {
        FailsenseError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for FailsenseError {
    fn from(err: ndarray::ShapeError) -> Self {
        FailsenseError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
