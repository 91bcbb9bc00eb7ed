//! Prediction pipeline: feature assembly followed by classification.

use std::sync::Arc;

use crate::domain::{FeatureVector, LabPanel, TriageResult};
use crate::ports::{Classifier, ClassifierError};

use super::features::{FeatureAssembler, IncompletePanelError};

/// Errors from the prediction path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error(transparent)]
    Incomplete(#[from] IncompletePanelError),

    /// The model never loaded; the process runs in degraded mode.
    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    #[error("Classifier failed: {0}")]
    Classifier(#[from] ClassifierError),
}

/// Outcome of the one-time classifier load at startup.
#[derive(Clone)]
pub enum ClassifierSlot {
    Loaded(Arc<dyn Classifier>),
    /// Permanent for the life of the process; not retried.
    Unavailable(String),
}

impl ClassifierSlot {
    pub fn loaded(classifier: impl Classifier + 'static) -> Self {
        Self::Loaded(Arc::new(classifier))
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

impl std::fmt::Debug for ClassifierSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loaded(c) => f.debug_tuple("Loaded").field(&c.describe()).finish(),
            Self::Unavailable(reason) => f.debug_tuple("Unavailable").field(reason).finish(),
        }
    }
}

/// Runs the classifier on complete panels.
///
/// Holds no per-request state; share one instance across threads.
#[derive(Debug, Clone)]
pub struct PredictionPipeline {
    classifier: ClassifierSlot,
}

impl PredictionPipeline {
    #[must_use]
    pub fn new(classifier: ClassifierSlot) -> Self {
        Self { classifier }
    }

    #[must_use]
    pub fn classifier(&self) -> &ClassifierSlot {
        &self.classifier
    }

    /// Classify a complete panel.
    ///
    /// # Errors
    /// `Incomplete` if any measurement is missing, `ClassifierUnavailable`
    /// if the model was never loaded, `Classifier` if scoring failed.
    pub fn predict(&self, panel: &LabPanel) -> Result<TriageResult, PredictionError> {
        let features = FeatureAssembler::assemble(panel)?;
        self.classify(&features)
    }

    /// Classify an already assembled vector.
    ///
    /// # Errors
    /// As [`predict`](Self::predict), minus the completeness check.
    pub fn classify(&self, features: &FeatureVector) -> Result<TriageResult, PredictionError> {
        let classifier = match &self.classifier {
            ClassifierSlot::Loaded(c) => c,
            ClassifierSlot::Unavailable(reason) => {
                tracing::warn!("Prediction requested while classifier unavailable");
                return Err(PredictionError::ClassifierUnavailable(reason.clone()));
            }
        };

        let label = classifier.predict(features)?;
        let triage = TriageResult::from_label(label);
        tracing::debug!("Classifier label {} -> {}", label, triage);
        Ok(triage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Measurement;

    struct FixedLabel(u8);

    impl Classifier for FixedLabel {
        fn predict(&self, _features: &FeatureVector) -> Result<u8, ClassifierError> {
            Ok(self.0)
        }
    }

    struct Failing;

    impl Classifier for Failing {
        fn predict(&self, _features: &FeatureVector) -> Result<u8, ClassifierError> {
            Err(ClassifierError::Inference("boom".into()))
        }
    }

    fn complete_panel() -> LabPanel {
        Measurement::ALL.iter().map(|m| (*m, 1.0)).collect()
    }

    #[test]
    fn test_label_mapping() {
        let inpatient = PredictionPipeline::new(ClassifierSlot::loaded(FixedLabel(1)));
        assert_eq!(
            inpatient.predict(&complete_panel()).expect("predict"),
            TriageResult::Inpatient
        );

        let outpatient = PredictionPipeline::new(ClassifierSlot::loaded(FixedLabel(0)));
        assert_eq!(
            outpatient.predict(&complete_panel()).expect("predict"),
            TriageResult::Outpatient
        );
    }

    #[test]
    fn test_incomplete_panel_checked_before_classifier() {
        let pipeline = PredictionPipeline::new(ClassifierSlot::Unavailable("no model".into()));
        let mut panel = complete_panel();
        panel.remove(Measurement::Mcv);
        let err = pipeline.predict(&panel).expect_err("incomplete");
        assert_eq!(
            err,
            PredictionError::Incomplete(IncompletePanelError {
                missing: vec![Measurement::Mcv]
            })
        );
    }

    #[test]
    fn test_unavailable_classifier() {
        let pipeline = PredictionPipeline::new(ClassifierSlot::Unavailable("no model".into()));
        assert!(!pipeline.classifier().is_available());
        let err = pipeline.predict(&complete_panel()).expect_err("degraded");
        assert_eq!(err, PredictionError::ClassifierUnavailable("no model".into()));
    }

    #[test]
    fn test_classifier_failure_propagates() {
        let pipeline = PredictionPipeline::new(ClassifierSlot::loaded(Failing));
        let err = pipeline.predict(&complete_panel()).expect_err("failing model");
        assert!(matches!(err, PredictionError::Classifier(ClassifierError::Inference(_))));
    }
}
