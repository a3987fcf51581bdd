//! Integration test: artifact persistence round-trips

use failsense::artifacts::{ArtifactKind, ArtifactStore};
use failsense::error::FailsenseError;
use failsense::inference::PredictEngine;
use failsense::schema::{self, ProductType, RawRecord, TARGET_COLUMN};
use failsense::training::{TrainEngine, TrainingConfig};
use polars::prelude::*;
use tempfile::tempdir;

fn fitted_engine() -> TrainEngine {
    let n = 120;
    let mut air = Vec::new();
    let mut proc = Vec::new();
    let mut speed = Vec::new();
    let mut torque = Vec::new();
    let mut wear = Vec::new();
    let mut ptype = Vec::new();
    let mut target = Vec::new();

    for i in 0..n {
        let x = i as f64;
        air.push(297.5 + (x % 7.0) * 0.5);
        proc.push(308.2 + (x % 6.0) * 0.6);
        speed.push(1340.0 + 9.0 * (x % 38.0));
        torque.push(26.0 + (x % 38.0));
        wear.push(1.8 * x);
        ptype.push(["L", "M", "H"][i % 3]);
        target.push(if (26.0 + (x % 38.0)) > 46.0 { 1.0 } else { 0.0 });
    }

    let df = df!(
        "Air_temperature_K" => &air,
        "Process_temperature_K" => &proc,
        "Rotational_speed_rpm" => &speed,
        "Torque_Nm" => &torque,
        "Tool_wear_min" => &wear,
        "Type" => &ptype,
        TARGET_COLUMN => &target,
    )
    .unwrap();

    let mut engine = TrainEngine::new(TrainingConfig::default().with_n_estimators(15));
    engine.fit(&df).unwrap();
    engine
}

fn probe_records() -> Vec<RawRecord> {
    vec![
        RawRecord::new(298.0, 308.6, 1551.0, 42.8, 0.0, ProductType::L),
        RawRecord::new(300.2, 310.0, 1420.0, 58.0, 190.0, ProductType::M),
        RawRecord::new(299.1, 309.3, 1480.0, 35.0, 60.0, ProductType::H),
    ]
}

#[test]
fn test_artifact_roundtrip_preserves_predictions() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());

    let engine = fitted_engine();
    store.save_training(&engine).unwrap();

    assert!(store.model_path().exists());
    assert!(store.scaler_path().exists());
    assert!(store.feature_columns_path().exists());

    let direct = PredictEngine::from_parts(
        engine.model().unwrap().clone(),
        engine.transformer().clone(),
    )
    .unwrap();
    let loaded = PredictEngine::load(&store).unwrap();

    let records = probe_records();
    let before = direct.predict(&records).unwrap();
    let after = loaded.predict(&records).unwrap();

    assert_eq!(
        before, after,
        "a loaded model must behave identically to the in-memory one"
    );
}

#[test]
fn test_load_from_empty_store_fails_loudly() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());

    match PredictEngine::load(&store) {
        Err(FailsenseError::ArtifactNotFound(path)) => {
            assert!(path.contains("feature_columns"));
        }
        other => panic!("expected ArtifactNotFound, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_partial_artifacts_fail_loudly() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());

    let engine = fitted_engine();
    store.save_training(&engine).unwrap();
    std::fs::remove_file(store.model_path()).unwrap();

    assert!(matches!(
        PredictEngine::load(&store),
        Err(FailsenseError::ArtifactNotFound(_))
    ));
}

#[test]
fn test_stale_schema_artifact_rejected() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());

    let engine = fitted_engine();
    store.save_training(&engine).unwrap();

    // Rewrite the column-list artifact as if it came from an older schema
    // with a different column order.
    let mut stale_columns = schema::engineered_columns();
    stale_columns.swap(0, 1);
    store
        .save(
            &store.feature_columns_path(),
            &stale_columns,
            ArtifactKind::FeatureColumns,
            &schema::schema_fingerprint(&stale_columns),
        )
        .unwrap();

    assert!(matches!(
        PredictEngine::load(&store),
        Err(FailsenseError::SchemaMismatch { .. })
    ));
}

#[test]
fn test_corrupt_blob_rejected() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());

    let engine = fitted_engine();
    store.save_training(&engine).unwrap();
    std::fs::write(store.scaler_path(), "{\"not\": \"an artifact\"}").unwrap();

    assert!(matches!(
        PredictEngine::load(&store),
        Err(FailsenseError::ArtifactError(_))
    ));
}
