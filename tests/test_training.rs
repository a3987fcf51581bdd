//! Integration test: training pipeline end-to-end

use failsense::schema::TARGET_COLUMN;
use failsense::training::{ModelMetrics, TrainEngine, TrainingConfig};
use polars::prelude::*;

fn classification_df(n: usize) -> DataFrame {
    let mut air = Vec::with_capacity(n);
    let mut proc = Vec::with_capacity(n);
    let mut speed = Vec::with_capacity(n);
    let mut torque = Vec::with_capacity(n);
    let mut wear = Vec::with_capacity(n);
    let mut ptype = Vec::with_capacity(n);
    let mut target = Vec::with_capacity(n);

    for i in 0..n {
        let x = i as f64;
        air.push(297.0 + (x % 8.0) * 0.6);
        proc.push(308.0 + (x % 5.0) * 0.7);
        speed.push(1320.0 + 11.0 * (x % 35.0));
        torque.push(28.0 + (x % 35.0));
        wear.push(220.0 * (x / n as f64));
        ptype.push(["L", "L", "M", "H"][i % 4]);
        // Failures cluster at high torque with worn tools
        let fails = (28.0 + (x % 35.0)) > 48.0 && 220.0 * (x / n as f64) > 90.0;
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
fn test_training_produces_full_metrics() {
    let df = classification_df(160);
    let mut engine = TrainEngine::new(TrainingConfig::default().with_n_estimators(25));
    engine.fit(&df).unwrap();

    let metrics = engine.metrics().expect("metrics after fit");
    assert!((0.0..=1.0).contains(&metrics.accuracy));
    assert!((0.0..=1.0).contains(&metrics.precision));
    assert!((0.0..=1.0).contains(&metrics.recall));
    assert!((0.0..=1.0).contains(&metrics.f1_score));
    assert!((0.0..=1.0).contains(&metrics.auc_roc));
    assert_eq!(metrics.threshold, 0.7);
    assert!(metrics.training_time_secs > 0.0);
}

#[test]
fn test_model_learns_the_failure_pattern() {
    let df = classification_df(200);
    let mut engine = TrainEngine::new(TrainingConfig::default().with_n_estimators(40));
    engine.fit(&df).unwrap();

    let metrics = engine.metrics().unwrap();
    assert!(
        metrics.auc_roc > 0.7,
        "AUC ({}) should beat random ranking on a learnable pattern",
        metrics.auc_roc
    );
}

#[test]
fn test_threshold_monotonicity() {
    let df = classification_df(160);
    let mut engine = TrainEngine::new(TrainingConfig::default().with_n_estimators(25));
    engine.fit(&df).unwrap();

    let probs = engine.predict_proba(&df).unwrap();

    let mut prev = usize::MAX;
    for threshold in [0.1, 0.3, 0.5, 0.7, 0.9] {
        let count = ModelMetrics::positive_count(&probs, threshold);
        assert!(
            count <= prev,
            "raising the threshold from below must never add positive predictions"
        );
        prev = count;
    }
}

#[test]
fn test_seeded_training_is_reproducible() {
    let df = classification_df(160);

    let mut a = TrainEngine::new(TrainingConfig::default().with_n_estimators(20));
    a.fit(&df).unwrap();
    let mut b = TrainEngine::new(TrainingConfig::default().with_n_estimators(20));
    b.fit(&df).unwrap();

    assert_eq!(
        a.predict_proba(&df).unwrap(),
        b.predict_proba(&df).unwrap(),
        "identical config and data must give identical probabilities"
    );

    let ma = a.metrics().unwrap();
    let mb = b.metrics().unwrap();
    assert_eq!(ma.accuracy, mb.accuracy);
    assert_eq!(ma.auc_roc, mb.auc_roc);
}

#[test]
fn test_different_seeds_may_differ() {
    let df = classification_df(160);

    let mut a = TrainEngine::new(
        TrainingConfig::default()
            .with_n_estimators(20)
            .with_random_state(1),
    );
    a.fit(&df).unwrap();
    let mut b = TrainEngine::new(
        TrainingConfig::default()
            .with_n_estimators(20)
            .with_random_state(2),
    );
    b.fit(&df).unwrap();

    // Not asserting inequality of probabilities (they could coincide);
    // just that both runs complete and evaluate.
    assert!(a.metrics().is_some());
    assert!(b.metrics().is_some());
}

#[test]
fn test_single_class_dataset_aborts_training() {
    let df = classification_df(100);
    let mut df = df;
    let zeros = Column::new(TARGET_COLUMN.into(), vec![0.0f64; df.height()]);
    df.with_column(zeros).unwrap();

    let mut engine = TrainEngine::new(TrainingConfig::default().with_n_estimators(5));
    assert!(engine.fit(&df).is_err(), "degenerate target must be fatal");
    assert!(engine.metrics().is_none());
}

#[test]
fn test_missing_feature_column_aborts_training() {
    let df = classification_df(100);
    let df = df.drop("Torque_Nm").unwrap();

    let mut engine = TrainEngine::new(TrainingConfig::default().with_n_estimators(5));
    assert!(engine.fit(&df).is_err());
}
