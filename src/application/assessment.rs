//! Assessment service: range warnings and triage for one request.
//!
//! Validation and prediction run independently; a failure in one never
//! hides the result of the other.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Demographics, LabPanel, TriageResult, Warning};

use super::prediction::{PredictionError, PredictionPipeline};
use super::validation::{RangeValidator, ValidationInputError};

/// Both results of one assessment request.
#[derive(Debug, Clone)]
pub struct Assessment {
    pub warnings: Result<Vec<Warning>, ValidationInputError>,
    pub triage: Result<TriageResult, PredictionError>,
    pub assessed_at: DateTime<Utc>,
}

/// Serializable view of an [`Assessment`] for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentReport {
    pub warnings: Vec<Warning>,
    pub warning_messages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triage: Option<TriageResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction_error: Option<String>,
    pub assessed_at: DateTime<Utc>,
}

impl Assessment {
    #[must_use]
    pub fn report(&self) -> AssessmentReport {
        let (warnings, validation_error) = match &self.warnings {
            Ok(w) => (w.clone(), None),
            Err(e) => (Vec::new(), Some(e.to_string())),
        };
        let (triage, prediction_error) = match &self.triage {
            Ok(t) => (Some(*t), None),
            Err(e) => (None, Some(e.to_string())),
        };

        AssessmentReport {
            warning_messages: warnings.iter().map(ToString::to_string).collect(),
            warnings,
            validation_error,
            triage,
            prediction_error,
            assessed_at: self.assessed_at,
        }
    }
}

/// Service combining the range validator and the prediction pipeline.
#[derive(Debug, Clone)]
pub struct AssessmentService<'t> {
    validator: RangeValidator<'t>,
    pipeline: PredictionPipeline,
}

impl<'t> AssessmentService<'t> {
    #[must_use]
    pub fn new(validator: RangeValidator<'t>, pipeline: PredictionPipeline) -> Self {
        Self {
            validator,
            pipeline,
        }
    }

    /// Validate and classify one panel.
    pub fn assess(&self, panel: &LabPanel, demographics: &Demographics) -> Assessment {
        let warnings = self.validator.validate(panel, demographics);
        if let Err(e) = &warnings {
            if e.is_internal() {
                tracing::error!("Reference table inconsistency: {}", e);
            } else {
                tracing::info!("Range check rejected input: {}", e);
            }
        }

        let triage = self.pipeline.predict(panel);

        tracing::info!(
            "Assessment complete: warnings={}, triage={}",
            warnings
                .as_ref()
                .map_or_else(|_| "error".to_string(), |w| w.len().to_string()),
            triage
                .as_ref()
                .map_or_else(|_| "error".to_string(), ToString::to_string),
        );

        Assessment {
            warnings,
            triage,
            assessed_at: Utc::now(),
        }
    }
}
