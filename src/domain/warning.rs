//! Out-of-range signal produced by the range validator.

use serde::{Deserialize, Serialize};

use super::limits::ReferenceRange;
use super::measurement::Measurement;

/// A measurement fell outside its reference range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub measurement: Measurement,
    pub low: f64,
    pub high: f64,
}

impl Warning {
    #[must_use]
    pub fn new(measurement: Measurement, range: ReferenceRange) -> Self {
        Self {
            measurement,
            low: range.low,
            high: range.high,
        }
    }

    #[must_use]
    pub fn range(&self) -> ReferenceRange {
        ReferenceRange::new(self.low, self.high)
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} out of normal range ({})",
            self.measurement,
            self.range()
        )
    }
}
