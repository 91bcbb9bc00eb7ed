//! Triage outcome types.
//!
//! Represents the interpreted output of the patient classifier.

use serde::{Deserialize, Serialize};

/// Binary care-setting classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriageResult {
    /// Admission recommended
    Inpatient,
    /// Ambulatory care sufficient
    Outpatient,
}

impl TriageResult {
    /// Map the classifier's raw label: `1` is inpatient, anything else outpatient.
    #[must_use]
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            Self::Inpatient
        } else {
            Self::Outpatient
        }
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Inpatient => "Inpatient - admission recommended",
            Self::Outpatient => "Outpatient - ambulatory follow-up",
        }
    }
}

impl std::fmt::Display for TriageResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inpatient => write!(f, "Inpatient"),
            Self::Outpatient => write!(f, "Outpatient"),
        }
    }
}
