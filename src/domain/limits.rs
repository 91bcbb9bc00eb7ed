//! Clinical reference ranges for the hematology panel.
//!
//! HAEMATOCRIT is banded by age; every other measurement is keyed by gender.
//! The canonical table is built once per process and only read afterwards.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::demographics::Gender;
use super::measurement::Measurement;

static STANDARD_TABLE: OnceLock<ReferenceLimitTable> = OnceLock::new();

/// Errors raised while building or querying a reference table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LimitError {
    /// The table has no entry of the requested shape for this measurement.
    #[error("No reference limit of the requested kind for {0}")]
    UnknownMeasurement(Measurement),

    #[error("Unknown gender: {0:?} (expected M or F)")]
    UnknownGender(String),

    /// No age band covers the given age.
    #[error("Age {age} is outside the age bands defined for {measurement}")]
    AgeOutOfTableDomain { measurement: Measurement, age: f64 },

    #[error("Invalid reference table: {0}")]
    InvalidTable(String),
}

/// Closed interval `[low, high]` of clinically normal values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub low: f64,
    pub high: f64,
}

impl ReferenceRange {
    #[must_use]
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Inclusive on both ends. NaN is never contained.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

impl std::fmt::Display for ReferenceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Half-open age interval `[age_min, age_max)` with its reference range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeBand {
    pub age_min: f64,

    /// `None` for the open-ended terminal band.
    pub age_max: Option<f64>,

    pub range: ReferenceRange,
}

impl AgeBand {
    #[must_use]
    pub const fn new(age_min: f64, age_max: f64, range: ReferenceRange) -> Self {
        Self {
            age_min,
            age_max: Some(age_max),
            range,
        }
    }

    #[must_use]
    pub const fn open_ended(age_min: f64, range: ReferenceRange) -> Self {
        Self {
            age_min,
            age_max: None,
            range,
        }
    }

    #[must_use]
    pub fn contains_age(&self, age: f64) -> bool {
        self.age_min <= age && self.age_max.map_or(true, |max| age < max)
    }
}

/// Shape of a reference limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    AgeBanded,
    GenderKeyed,
}

/// Reference limit for one measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReferenceLimit {
    /// Contiguous age bands covering `[0, ∞)`.
    AgeBanded(Vec<AgeBand>),

    GenderKeyed {
        male: ReferenceRange,
        female: ReferenceRange,
    },
}

impl ReferenceLimit {
    #[must_use]
    pub fn kind(&self) -> LimitKind {
        match self {
            Self::AgeBanded(_) => LimitKind::AgeBanded,
            Self::GenderKeyed { .. } => LimitKind::GenderKeyed,
        }
    }

    fn validate(&self, measurement: Measurement) -> Result<(), LimitError> {
        let invalid = |msg: String| Err(LimitError::InvalidTable(format!("{measurement}: {msg}")));

        match self {
            Self::GenderKeyed { male, female } => {
                for range in [male, female] {
                    if !valid_range(range) {
                        return invalid(format!("bad range {range}"));
                    }
                }
            }
            Self::AgeBanded(bands) => {
                let Some(first) = bands.first() else {
                    return invalid("no age bands".to_string());
                };
                if first.age_min != 0.0 {
                    return invalid(format!("first band starts at {}, not 0", first.age_min));
                }
                for (i, band) in bands.iter().enumerate() {
                    if !valid_range(&band.range) {
                        return invalid(format!("bad range {} in band {i}", band.range));
                    }
                    let is_last = i + 1 == bands.len();
                    match (band.age_max, is_last) {
                        (None, true) => {}
                        (None, false) => {
                            return invalid(format!("band {i} is open-ended but not last"));
                        }
                        (Some(_), true) => {
                            return invalid("last band must be open-ended".to_string());
                        }
                        (Some(max), false) => {
                            if !(max > band.age_min) {
                                return invalid(format!("band {i} is empty"));
                            }
                            let next_min = bands[i + 1].age_min;
                            if next_min != max {
                                return invalid(format!(
                                    "gap or overlap between {max} and {next_min}"
                                ));
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn valid_range(range: &ReferenceRange) -> bool {
    range.low.is_finite() && range.high.is_finite() && range.low <= range.high
}

/// The shape each measurement's limit must have.
#[must_use]
pub fn expected_kind(measurement: Measurement) -> LimitKind {
    match measurement {
        Measurement::Haematocrit => LimitKind::AgeBanded,
        Measurement::Haemoglobins
        | Measurement::Erythrocyte
        | Measurement::Leucocyte
        | Measurement::Thrombocyte
        | Measurement::Mch
        | Measurement::Mchc
        | Measurement::Mcv => LimitKind::GenderKeyed,
    }
}

/// Immutable table of reference limits keyed by measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLimitTable {
    limits: BTreeMap<Measurement, ReferenceLimit>,
}

impl ReferenceLimitTable {
    /// Build a table, checking it covers every measurement with the right
    /// shape and that age bands are contiguous from 0 to open-ended.
    ///
    /// # Errors
    /// Returns `LimitError::InvalidTable` describing the first violation.
    pub fn new(
        entries: impl IntoIterator<Item = (Measurement, ReferenceLimit)>,
    ) -> Result<Self, LimitError> {
        let mut limits = BTreeMap::new();
        for (measurement, limit) in entries {
            if limit.kind() != expected_kind(measurement) {
                return Err(LimitError::InvalidTable(format!(
                    "{measurement} must be {:?}, got {:?}",
                    expected_kind(measurement),
                    limit.kind()
                )));
            }
            limit.validate(measurement)?;
            if limits.insert(measurement, limit).is_some() {
                return Err(LimitError::InvalidTable(format!(
                    "duplicate entry for {measurement}"
                )));
            }
        }

        if let Some(missing) = Measurement::ALL.iter().find(|m| !limits.contains_key(m)) {
            return Err(LimitError::InvalidTable(format!("missing entry for {missing}")));
        }

        Ok(Self { limits })
    }

    /// The canonical process-wide table, checked by [`new`](Self::new) on
    /// first use.
    ///
    /// # Panics
    /// If the built-in entries break a table invariant.
    #[must_use]
    pub fn standard() -> &'static Self {
        STANDARD_TABLE.get_or_init(|| {
            Self::new(standard_entries()).expect("Valid built-in reference table")
        })
    }

    #[must_use]
    pub fn limit(&self, measurement: Measurement) -> Option<&ReferenceLimit> {
        self.limits.get(&measurement)
    }

    /// Range from the unique band with `age_min <= age < age_max`.
    ///
    /// # Errors
    /// `UnknownMeasurement` if the measurement is not age-banded,
    /// `AgeOutOfTableDomain` if no band covers `age` (negative or NaN).
    pub fn lookup_age_banded(
        &self,
        measurement: Measurement,
        age: f64,
    ) -> Result<ReferenceRange, LimitError> {
        let Some(ReferenceLimit::AgeBanded(bands)) = self.limits.get(&measurement) else {
            return Err(LimitError::UnknownMeasurement(measurement));
        };

        bands
            .iter()
            .find(|band| band.contains_age(age))
            .map(|band| band.range)
            .ok_or(LimitError::AgeOutOfTableDomain { measurement, age })
    }

    /// Range for the given gender, normalized from its submitted form.
    ///
    /// # Errors
    /// `UnknownMeasurement` if the measurement is not gender-keyed,
    /// `UnknownGender` if `gender` is not M/F after normalization.
    pub fn lookup_gender_keyed(
        &self,
        measurement: Measurement,
        gender: &str,
    ) -> Result<ReferenceRange, LimitError> {
        let Some(ReferenceLimit::GenderKeyed { male, female }) = self.limits.get(&measurement)
        else {
            return Err(LimitError::UnknownMeasurement(measurement));
        };

        Ok(match Gender::parse(gender)? {
            Gender::Male => *male,
            Gender::Female => *female,
        })
    }
}

fn same_for_both(low: f64, high: f64) -> ReferenceLimit {
    ReferenceLimit::GenderKeyed {
        male: ReferenceRange::new(low, high),
        female: ReferenceRange::new(low, high),
    }
}

/// Canonical clinical reference ranges.
#[must_use]
pub fn standard_entries() -> Vec<(Measurement, ReferenceLimit)> {
    vec![
        (
            Measurement::Haematocrit,
            ReferenceLimit::AgeBanded(vec![
                AgeBand::new(0.0, 1.0, ReferenceRange::new(45.0, 62.0)),
                AgeBand::new(1.0, 2.0, ReferenceRange::new(30.0, 44.0)),
                AgeBand::new(2.0, 6.0, ReferenceRange::new(32.0, 41.0)),
                AgeBand::new(6.0, 12.0, ReferenceRange::new(36.0, 42.0)),
                AgeBand::open_ended(12.0, ReferenceRange::new(30.0, 44.0)),
            ]),
        ),
        (
            Measurement::Haemoglobins,
            ReferenceLimit::GenderKeyed {
                male: ReferenceRange::new(12.5, 16.7),
                female: ReferenceRange::new(12.0, 15.6),
            },
        ),
        (
            Measurement::Erythrocyte,
            ReferenceLimit::GenderKeyed {
                male: ReferenceRange::new(4.1, 6.0),
                female: ReferenceRange::new(4.0, 5.3),
            },
        ),
        (Measurement::Leucocyte, same_for_both(4.56, 10.3)),
        (Measurement::Thrombocyte, same_for_both(159.0, 391.0)),
        (Measurement::Mch, same_for_both(28.0, 32.0)),
        (Measurement::Mchc, same_for_both(33.0, 37.0)),
        (Measurement::Mcv, same_for_both(75.0, 96.0)),
    ]
}
