//! Training engine: engineered matrix -> fitted classifier + metrics

use crate::error::{FailsenseError, Result};
use crate::preprocessing::FeatureTransformer;
use super::config::TrainingConfig;
use super::gradient_boosting::GradientBoostingClassifier;
use super::metrics::ModelMetrics;
use ndarray::{Array1, Array2};
use polars::prelude::*;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::Instant;
use tracing::info;

/// Main training engine.
///
/// Owns the single feature transformer used for both the training matrix and
/// every later prediction, so the engineered schema cannot diverge.
#[derive(Debug, Clone)]
pub struct TrainEngine {
    config: TrainingConfig,
    transformer: FeatureTransformer,
    model: Option<GradientBoostingClassifier>,
    metrics: Option<ModelMetrics>,
    is_fitted: bool,
}

impl TrainEngine {
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            transformer: FeatureTransformer::new(),
            model: None,
            metrics: None,
            is_fitted: false,
        }
    }

    /// Fit the classifier on a cleaned raw frame.
    ///
    /// Fits the transformer on the full feature frame first (matching the
    /// training routine's step order), then splits, trains with the configured
    /// seed, and evaluates the held-out partition at the decision threshold.
    /// Any failure aborts before artifacts can be written.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let start = Instant::now();

        let y = self.extract_target(df)?;

        info!("fitting feature transformer");
        let engineered = self.transformer.fit_transform(df)?;
        let x = self.transformer.to_matrix(&engineered)?;

        let (x_train, x_test, y_train, y_test) = self.train_test_split(&x, &y)?;
        info!(
            train_rows = x_train.nrows(),
            test_rows = x_test.nrows(),
            "split dataset"
        );

        let mut model = GradientBoostingClassifier::new(self.config.booster.clone());
        model.fit(&x_train, &y_train)?;

        let y_prob = model.predict_proba(&x_test)?;
        let mut metrics =
            ModelMetrics::compute(&y_test, &y_prob, self.config.decision_threshold);
        metrics.training_time_secs = start.elapsed().as_secs_f64();

        info!(
            accuracy = metrics.accuracy,
            f1 = metrics.f1_score,
            auc = metrics.auc_roc,
            threshold = metrics.threshold,
            "training complete"
        );

        self.model = Some(model);
        self.metrics = Some(metrics);
        self.is_fitted = true;
        Ok(self)
    }

    /// Failure probabilities for a raw feature frame
    pub fn predict_proba(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let model = self.model.as_ref().ok_or(FailsenseError::ModelNotFitted)?;
        let engineered = self.transformer.transform(df)?;
        let x = self.transformer.to_matrix(&engineered)?;
        model.predict_proba(&x)
    }

    /// Binary labels at the configured decision threshold
    pub fn predict(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let probs = self.predict_proba(df)?;
        Ok(probs
            .iter()
            .map(|&p| {
                if p >= self.config.decision_threshold {
                    1.0
                } else {
                    0.0
                }
            })
            .collect())
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Metrics from the last fit
    pub fn metrics(&self) -> Option<&ModelMetrics> {
        self.metrics.as_ref()
    }

    /// The fitted transformer (scaler parameters + frozen column order)
    pub fn transformer(&self) -> &FeatureTransformer {
        &self.transformer
    }

    /// The fitted classifier
    pub fn model(&self) -> Result<&GradientBoostingClassifier> {
        self.model.as_ref().ok_or(FailsenseError::ModelNotFitted)
    }

    fn extract_target(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let target_series = df
            .column(&self.config.target_column)
            .map_err(|_| FailsenseError::FeatureNotFound(self.config.target_column.clone()))?;

        if target_series.null_count() > 0 {
            return Err(FailsenseError::TrainingError(format!(
                "target column '{}' contains missing values",
                self.config.target_column
            )));
        }

        let target_f64 = target_series
            .cast(&DataType::Float64)
            .map_err(|e| FailsenseError::DataError(e.to_string()))?;

        let y: Array1<f64> = target_f64
            .f64()
            .map_err(|e| FailsenseError::DataError(e.to_string()))?
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect();

        Ok(y)
    }

    /// Seeded shuffle split into train and held-out test partitions
    fn train_test_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> Result<(Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>)> {
        let n = x.nrows();
        let n_test = ((n as f64) * self.config.test_split).round() as usize;

        if n_test == 0 || n_test >= n {
            return Err(FailsenseError::TrainingError(format!(
                "cannot split {} rows with test fraction {}",
                n, self.config.test_split
            )));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };
        indices.shuffle(&mut rng);

        let (test_idx, train_idx) = indices.split_at(n_test);

        let x_train = x.select(ndarray::Axis(0), train_idx);
        let x_test = x.select(ndarray::Axis(0), test_idx);
        let y_train: Array1<f64> = Array1::from_vec(train_idx.iter().map(|&i| y[i]).collect());
        let y_test: Array1<f64> = Array1::from_vec(test_idx.iter().map(|&i| y[i]).collect());

        Ok((x_train, x_test, y_train, y_test))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TARGET_COLUMN;

    fn training_df(n: usize) -> DataFrame {
        let mut air = Vec::with_capacity(n);
        let mut proc = Vec::with_capacity(n);
        let mut speed = Vec::with_capacity(n);
        let mut torque = Vec::with_capacity(n);
        let mut wear = Vec::with_capacity(n);
        let mut ptype = Vec::with_capacity(n);
        let mut target = Vec::with_capacity(n);

        for i in 0..n {
            let x = i as f64;
            air.push(297.0 + (x % 7.0));
            proc.push(307.5 + (x % 5.0));
            speed.push(1300.0 + 10.0 * (x % 40.0));
            // High torque with heavy wear drives failures
            torque.push(30.0 + (x % 30.0));
            wear.push(200.0 * (x / n as f64));
            ptype.push(["L", "M", "H"][i % 3]);
            let fails = (30.0 + (x % 30.0)) > 50.0 && 200.0 * (x / n as f64) > 80.0;
            target.push(if fails { 1.0 } else { 0.0 });
        }

        df!(
            "Air_temperature_K" => &air,
            "Process_temperature_K" => &proc,
            "Rotational_speed_rpm" => &speed,
            "Torque_Nm" => &torque,
            "Tool_wear_min" => &wear,
            "Type" => &ptype,
            TARGET_COLUMN => &target,
        )
        .unwrap()
    }

    #[test]
    fn test_fit_produces_metrics() {
        let df = training_df(120);
        let mut engine = TrainEngine::new(TrainingConfig::default().with_n_estimators(20));
        engine.fit(&df).unwrap();

        let metrics = engine.metrics().expect("metrics after fit");
        assert!(metrics.accuracy > 0.0);
        assert_eq!(metrics.threshold, 0.7);
        assert!(metrics.n_samples > 0);
    }

    #[test]
    fn test_fit_is_reproducible() {
        let df = training_df(120);

        let mut a = TrainEngine::new(TrainingConfig::default().with_n_estimators(15));
        a.fit(&df).unwrap();
        let mut b = TrainEngine::new(TrainingConfig::default().with_n_estimators(15));
        b.fit(&df).unwrap();

        let pa = a.predict_proba(&df).unwrap();
        let pb = b.predict_proba(&df).unwrap();
        assert_eq!(pa, pb, "fixed seed must reproduce identical probabilities");
    }

    #[test]
    fn test_missing_target_is_fatal() {
        let df = training_df(60);
        let df = df.drop(TARGET_COLUMN).unwrap();

        let mut engine = TrainEngine::new(TrainingConfig::default());
        assert!(matches!(
            engine.fit(&df),
            Err(FailsenseError::FeatureNotFound(_))
        ));
    }

    #[test]
    fn test_degenerate_target_is_fatal() {
        let mut df = training_df(60);
        let zeros = Column::new(TARGET_COLUMN.into(), vec![0.0f64; df.height()]);
        df.with_column(zeros).unwrap();

        let mut engine = TrainEngine::new(TrainingConfig::default().with_n_estimators(5));
        assert!(matches!(
            engine.fit(&df),
            Err(FailsenseError::TrainingError(_))
        ));
        assert!(engine.metrics().is_none(), "no metrics on failed fit");
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let df = training_df(60);
        let engine = TrainEngine::new(TrainingConfig::default());
        assert!(matches!(
            engine.predict(&df),
            Err(FailsenseError::ModelNotFitted)
        ));
    }
}
