//! Artifact store: persisted model, scaler, and frozen column list
//!
//! Every blob is wrapped in a versioned JSON envelope carrying a magic tag,
//! format version, artifact kind, and the schema fingerprint of the frozen
//! column list. Loading rejects anything stale or mismatched instead of
//! silently producing wrong predictions.

use crate::error::{FailsenseError, Result};
use crate::preprocessing::{FeatureTransformer, StandardScaler};
use crate::training::{GradientBoostingClassifier, TrainEngine};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const MAGIC: &str = "FSNS";
const FORMAT_VERSION: u32 = 1;

/// Default artifact file names under the store root
pub const MODEL_FILE: &str = "model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const FEATURE_COLUMNS_FILE: &str = "feature_columns.json";

/// What an envelope contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Model,
    Scaler,
    FeatureColumns,
}

/// Versioned wrapper around a serialized payload
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    magic: String,
    format_version: u32,
    kind: ArtifactKind,
    schema_fingerprint: String,
    trained_at: String,
    payload: T,
}

/// Filesystem-backed artifact store rooted at one directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn model_path(&self) -> PathBuf {
        self.root.join(MODEL_FILE)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.root.join(SCALER_FILE)
    }

    pub fn feature_columns_path(&self) -> PathBuf {
        self.root.join(FEATURE_COLUMNS_FILE)
    }

    /// Persist all three artifacts from a fitted engine. Written only after a
    /// fully successful training run; the shared fingerprint ties them
    /// together.
    pub fn save_training(&self, engine: &TrainEngine) -> Result<()> {
        let transformer = engine.transformer();
        let fingerprint = transformer.fingerprint();

        self.save(
            &self.model_path(),
            engine.model()?,
            ArtifactKind::Model,
            &fingerprint,
        )?;
        self.save(
            &self.scaler_path(),
            transformer.scaler(),
            ArtifactKind::Scaler,
            &fingerprint,
        )?;
        self.save(
            &self.feature_columns_path(),
            &transformer.feature_columns().to_vec(),
            ArtifactKind::FeatureColumns,
            &fingerprint,
        )?;

        info!(root = %self.root.display(), "saved training artifacts");
        Ok(())
    }

    /// Load model + transformer, verifying that all three artifacts carry the
    /// same fingerprint and that it matches `expected_fingerprint` (the
    /// current schema). Never best-effort.
    pub fn load_training(
        &self,
        expected_fingerprint: &str,
    ) -> Result<(GradientBoostingClassifier, FeatureTransformer)> {
        let columns: Vec<String> = self.load(
            &self.feature_columns_path(),
            ArtifactKind::FeatureColumns,
            Some(expected_fingerprint),
        )?;
        let scaler: StandardScaler = self.load(
            &self.scaler_path(),
            ArtifactKind::Scaler,
            Some(expected_fingerprint),
        )?;
        let model: GradientBoostingClassifier = self.load(
            &self.model_path(),
            ArtifactKind::Model,
            Some(expected_fingerprint),
        )?;

        let transformer = FeatureTransformer::from_parts(scaler, columns)?;
        Ok((model, transformer))
    }

    /// Serialize one object into a versioned envelope, creating parent
    /// directories as needed.
    pub fn save<T: Serialize>(
        &self,
        path: &Path,
        obj: &T,
        kind: ArtifactKind,
        fingerprint: &str,
    ) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let envelope = Envelope {
            magic: MAGIC.to_string(),
            format_version: FORMAT_VERSION,
            kind,
            schema_fingerprint: fingerprint.to_string(),
            trained_at: Utc::now().to_rfc3339(),
            payload: obj,
        };

        let json = serde_json::to_string(&envelope)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and unwrap one envelope, verifying magic, version, kind, and
    /// (when given) the schema fingerprint.
    pub fn load<T: DeserializeOwned>(
        &self,
        path: &Path,
        kind: ArtifactKind,
        expected_fingerprint: Option<&str>,
    ) -> Result<T> {
        if !path.exists() {
            return Err(FailsenseError::ArtifactNotFound(
                path.display().to_string(),
            ));
        }

        let json = fs::read_to_string(path)?;
        let envelope: Envelope<T> = serde_json::from_str(&json).map_err(|e| {
            FailsenseError::ArtifactError(format!(
                "corrupt artifact at {}: {}",
                path.display(),
                e
            ))
        })?;

        if envelope.magic != MAGIC {
            return Err(FailsenseError::ArtifactError(format!(
                "{} is not a failsense artifact",
                path.display()
            )));
        }
        if envelope.format_version != FORMAT_VERSION {
            return Err(FailsenseError::ArtifactError(format!(
                "unsupported artifact format version {} at {}",
                envelope.format_version,
                path.display()
            )));
        }
        if envelope.kind != kind {
            return Err(FailsenseError::ArtifactError(format!(
                "expected {:?} artifact at {}, found {:?}",
                kind,
                path.display(),
                envelope.kind
            )));
        }
        if let Some(expected) = expected_fingerprint {
            if envelope.schema_fingerprint != expected {
                return Err(FailsenseError::SchemaMismatch {
                    detail: format!(
                        "artifact fingerprint '{}' != current '{}'",
                        envelope.schema_fingerprint, expected
                    ),
                });
            }
        }

        Ok(envelope.payload)
    }
}
