//! Classifier port: Trait for the pre-trained triage model.
//!
//! The model is opaque to the application. It maps an ordered feature
//! vector to a binary label and is never trained or inspected here.

use crate::domain::FeatureVector;

/// Errors raised by a classifier implementation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("Failed to load model artifact: {0}")]
    Load(String),

    #[error("Unsupported model format version: {0}")]
    UnsupportedVersion(u32),

    #[error("Model feature order does not match the lab panel: {0}")]
    FeatureMismatch(String),

    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Trait for binary triage classifiers.
///
/// Implementations must be safe to share across threads once loaded;
/// `predict` takes `&self` and must not mutate model state.
pub trait Classifier: Send + Sync {
    /// Predict the raw label for one feature vector.
    ///
    /// # Returns
    /// `1` for inpatient, `0` for outpatient.
    ///
    /// # Errors
    /// Returns `ClassifierError::Inference` if the model cannot score the input.
    fn predict(&self, features: &FeatureVector) -> Result<u8, ClassifierError>;

    /// Short identifier for logs (e.g. artifact name and version).
    fn describe(&self) -> String {
        "classifier".to_string()
    }
}
