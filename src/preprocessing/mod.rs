//! Data preprocessing module
//!
//! The feature-engineering contract shared by training and inference:
//! - Per-column standardization with frozen (mean, std) parameters
//! - Fixed-domain one-hot encoding of the product type
//! - The frozen engineered column order

mod scaler;
mod transformer;

pub use scaler::StandardScaler;
pub use transformer::FeatureTransformer;
