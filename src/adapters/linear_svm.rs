//! Linear SVM adapter: Implementation of Classifier from an exported artifact.
//!
//! The training pipeline exports the fitted scaler and linear decision
//! function as JSON. This adapter loads it once at startup and scores
//! feature vectors with `w · ((x - mean) / scale) + b`.
//!
//! # Artifact integrity
//!
//! A sidecar `<artifact>.sha256` holding the hex SHA-256 of the artifact (the
//! `sha256sum` output format is accepted) is verified when present, and is
//! mandatory when digest verification is required by configuration.
//!
//! # Feature order
//!
//! The artifact's `feature_names` must equal the lab panel training order
//! exactly. A reordered artifact is rejected at load time rather than
//! silently producing wrong predictions.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::application::ClassifierSlot;
use crate::domain::{FeatureVector, Measurement, FEATURE_COUNT};
use crate::ports::{Classifier, ClassifierError};

/// Artifact format version understood by this adapter.
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// Per-feature standardisation fitted during training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// JSON structure written by the training pipeline.
///
/// Unknown fields are rejected: a misspelled `scaler` key would otherwise
/// load as `None` and score raw features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportedLinearModel {
    pub format_version: u32,
    #[serde(default)]
    pub model_version: Option<String>,
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
}

/// Linear decision-function classifier.
#[derive(Debug, Clone)]
pub struct LinearSvmClassifier {
    model: ExportedLinearModel,
    source: PathBuf,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// Constant-time compare for ASCII hex digests.
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

fn digest_sidecar(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".sha256");
    PathBuf::from(name)
}

impl LinearSvmClassifier {
    /// Load and check an exported model.
    ///
    /// # Errors
    /// `Load` for unreadable files, bad JSON or digest mismatch,
    /// `UnsupportedVersion` for unknown format versions, and
    /// `FeatureMismatch` when the feature order or lengths are wrong.
    pub fn load(path: &Path, require_digest: bool) -> Result<Self, ClassifierError> {
        let bytes = std::fs::read(path)
            .map_err(|e| ClassifierError::Load(format!("{}: {e}", path.display())))?;

        Self::verify_digest(path, &bytes, require_digest)?;

        let model: ExportedLinearModel = serde_json::from_slice(&bytes)
            .map_err(|e| ClassifierError::Load(format!("Invalid model JSON: {e}")))?;
        let classifier = Self::from_model(model, path.to_path_buf())?;

        tracing::info!(
            "Loaded classifier from {:?} (format_version={}, model_version={})",
            path,
            classifier.model.format_version,
            classifier.model.model_version.as_deref().unwrap_or("unversioned"),
        );

        Ok(classifier)
    }

    /// Build from an in-memory model, applying the same checks as `load`.
    ///
    /// # Errors
    /// As [`load`](Self::load), minus file and digest errors.
    pub fn from_model(
        model: ExportedLinearModel,
        source: PathBuf,
    ) -> Result<Self, ClassifierError> {
        if model.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(ClassifierError::UnsupportedVersion(model.format_version));
        }

        let expected: Vec<&str> = Measurement::ALL.iter().map(Measurement::name).collect();
        if model.feature_names != expected {
            return Err(ClassifierError::FeatureMismatch(format!(
                "expected {expected:?}, got {:?}",
                model.feature_names
            )));
        }

        if model.coefficients.len() != FEATURE_COUNT {
            return Err(ClassifierError::FeatureMismatch(format!(
                "expected {FEATURE_COUNT} coefficients, got {}",
                model.coefficients.len()
            )));
        }

        if let Some(scaler) = &model.scaler {
            if scaler.mean.len() != FEATURE_COUNT || scaler.scale.len() != FEATURE_COUNT {
                return Err(ClassifierError::FeatureMismatch(
                    "Scaler parameter lengths do not match feature count".into(),
                ));
            }
            if scaler.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
                return Err(ClassifierError::Load(
                    "Scaler scale values must be finite and non-zero".into(),
                ));
            }
        }

        let all_finite = model
            .coefficients
            .iter()
            .chain(std::iter::once(&model.intercept))
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ClassifierError::Load("Model parameters must be finite".into()));
        }

        Ok(Self { model, source })
    }

    fn verify_digest(path: &Path, bytes: &[u8], require: bool) -> Result<(), ClassifierError> {
        let sidecar = digest_sidecar(path);
        if !sidecar.exists() {
            if require {
                return Err(ClassifierError::Load(format!(
                    "Digest file {} required but missing",
                    sidecar.display()
                )));
            }
            tracing::warn!("No digest file for model {:?}; integrity not verified", path);
            return Ok(());
        }

        let content = std::fs::read_to_string(&sidecar)
            .map_err(|e| ClassifierError::Load(format!("Failed to read digest: {e}")))?;
        let expected = content
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        if !constant_time_eq_str(&expected, &sha256_hex(bytes)) {
            return Err(ClassifierError::Load(format!(
                "Digest mismatch for {}",
                path.display()
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn model(&self) -> &ExportedLinearModel {
        &self.model
    }

    /// Signed distance from the separating hyperplane.
    #[must_use]
    pub fn decision_function(&self, features: &FeatureVector) -> f64 {
        let x = features.as_slice();
        let mut score = self.model.intercept;
        for (i, coef) in self.model.coefficients.iter().enumerate() {
            let value = match &self.model.scaler {
                Some(s) => (x[i] - s.mean[i]) / s.scale[i],
                None => x[i],
            };
            score += coef * value;
        }
        score
    }
}

impl Classifier for LinearSvmClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<u8, ClassifierError> {
        let score = self.decision_function(features);
        if !score.is_finite() {
            return Err(ClassifierError::Inference(format!(
                "Non-finite decision value {score}"
            )));
        }
        Ok(u8::from(score > 0.0))
    }

    fn describe(&self) -> String {
        format!(
            "linear-svm:{}@{}",
            self.source.display(),
            self.model.model_version.as_deref().unwrap_or("unversioned")
        )
    }
}

/// Load the classifier once at startup, degrading instead of failing.
///
/// Any load error is logged and turned into `ClassifierSlot::Unavailable`
/// so range validation keeps working without a model.
pub fn load_classifier(path: &Path, require_digest: bool) -> ClassifierSlot {
    match LinearSvmClassifier::load(path, require_digest) {
        Ok(classifier) => ClassifierSlot::loaded(classifier),
        Err(e) => {
            tracing::error!("Classifier unavailable, predictions disabled: {}", e);
            ClassifierSlot::Unavailable(e.to_string())
        }
    }
}
