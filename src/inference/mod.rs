//! Inference module
//!
//! Reconstructs the engineered feature row for new raw records using the
//! persisted transformer state, then scores them with the persisted
//! classifier. A batch of one is handled identically to a batch of many.

mod engine;

pub use engine::{PredictEngine, PredictionLabel, PredictionResult};
