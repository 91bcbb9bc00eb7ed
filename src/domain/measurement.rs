//! Hematology measurements accepted by the triage pipeline.

use serde::{Deserialize, Serialize};

/// Suffix carried by lab-value field keys in submitted forms (`MCV_status`).
pub const FORM_FIELD_SUFFIX: &str = "_status";

/// One of the eight fixed hematology measurements.
///
/// Declaration order is the classifier's training order and the order in
/// which warnings are reported. `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Measurement {
    /// Packed cell volume, %
    Haematocrit,
    /// Haemoglobin concentration, g/dL
    Haemoglobins,
    /// Red blood cell count, 10^12/L
    Erythrocyte,
    /// White blood cell count, 10^9/L
    Leucocyte,
    /// Platelet count, 10^9/L
    Thrombocyte,
    /// Mean corpuscular haemoglobin, pg
    Mch,
    /// Mean corpuscular haemoglobin concentration, g/dL
    Mchc,
    /// Mean corpuscular volume, fL
    Mcv,
}

impl Measurement {
    /// All measurements in training order.
    pub const ALL: [Measurement; 8] = [
        Self::Haematocrit,
        Self::Haemoglobins,
        Self::Erythrocyte,
        Self::Leucocyte,
        Self::Thrombocyte,
        Self::Mch,
        Self::Mchc,
        Self::Mcv,
    ];

    /// Canonical upper-case name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Haematocrit => "HAEMATOCRIT",
            Self::Haemoglobins => "HAEMOGLOBINS",
            Self::Erythrocyte => "ERYTHROCYTE",
            Self::Leucocyte => "LEUCOCYTE",
            Self::Thrombocyte => "THROMBOCYTE",
            Self::Mch => "MCH",
            Self::Mchc => "MCHC",
            Self::Mcv => "MCV",
        }
    }

    /// Form field key, e.g. `HAEMATOCRIT_status`.
    #[must_use]
    pub fn form_field(&self) -> &'static str {
        match self {
            Self::Haematocrit => "HAEMATOCRIT_status",
            Self::Haemoglobins => "HAEMOGLOBINS_status",
            Self::Erythrocyte => "ERYTHROCYTE_status",
            Self::Leucocyte => "LEUCOCYTE_status",
            Self::Thrombocyte => "THROMBOCYTE_status",
            Self::Mch => "MCH_status",
            Self::Mchc => "MCHC_status",
            Self::Mcv => "MCV_status",
        }
    }

    /// Position in the feature vector.
    #[must_use]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no known measurement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognised measurement: {0}")]
pub struct ParseMeasurementError(pub String);

impl std::str::FromStr for Measurement {
    type Err = ParseMeasurementError;

    /// Accepts the bare name in any case or the exact form field key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(m) = Self::ALL.iter().find(|m| m.form_field() == trimmed) {
            return Ok(*m);
        }
        Self::ALL
            .iter()
            .find(|m| m.name().eq_ignore_ascii_case(trimmed))
            .copied()
            .ok_or_else(|| ParseMeasurementError(s.to_string()))
    }
}
