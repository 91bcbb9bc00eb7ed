//! Domain layer: Core business types and logic.
//!
//! Pure types with no I/O. The reference table is the only process-wide
//! state and is read-only once built.

mod demographics;
mod limits;
mod measurement;
mod panel;
mod triage;
mod warning;

pub use demographics::{Demographics, Gender};
pub use limits::{
    expected_kind, standard_entries, AgeBand, LimitError, LimitKind, ReferenceLimit,
    ReferenceLimitTable, ReferenceRange,
};
pub use measurement::{Measurement, ParseMeasurementError, FORM_FIELD_SUFFIX};
pub use panel::{FeatureVector, LabPanel, FEATURE_COUNT};
pub use triage::TriageResult;
pub use warning::Warning;
