//! Feature assembly: complete panel to classifier input.

use crate::domain::{FeatureVector, LabPanel, Measurement, FEATURE_COUNT};

/// One or more required measurements are absent or not a finite number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Incomplete panel, missing or non-numeric: {}", join_names(.missing))]
pub struct IncompletePanelError {
    /// In training order.
    pub missing: Vec<Measurement>,
}

fn join_names(missing: &[Measurement]) -> String {
    missing
        .iter()
        .map(Measurement::name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds the fixed-order feature vector the classifier was trained on.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureAssembler;

impl FeatureAssembler {
    /// Assemble a complete panel.
    ///
    /// Position `i` of the result holds `Measurement::ALL[i]`, whatever order
    /// the panel was populated in.
    ///
    /// # Errors
    /// Returns `IncompletePanelError` listing every missing or non-finite value.
    pub fn assemble(panel: &LabPanel) -> Result<FeatureVector, IncompletePanelError> {
        let mut values = [0.0; FEATURE_COUNT];
        let mut missing = Vec::new();

        for measurement in Measurement::ALL {
            match panel.get(measurement) {
                Some(v) if v.is_finite() => values[measurement.index()] = v,
                _ => missing.push(measurement),
            }
        }

        if missing.is_empty() {
            Ok(FeatureVector::new(values))
        } else {
            Err(IncompletePanelError { missing })
        }
    }
}
