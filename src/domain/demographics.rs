//! Patient demographics used to select reference ranges.

use serde::{Deserialize, Serialize};

use super::limits::LimitError;

/// Patient gender as understood by the gender-keyed reference ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Normalize a submitted gender value.
    ///
    /// Accepts `M`, `F`, `MALE`, `FEMALE` in any case, surrounding whitespace ignored.
    ///
    /// # Errors
    /// Returns `LimitError::UnknownGender` for anything else.
    pub fn parse(raw: &str) -> Result<Self, LimitError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "M" | "MALE" => Ok(Self::Male),
            "F" | "FEMALE" => Ok(Self::Female),
            _ => Err(LimitError::UnknownGender(raw.to_string())),
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "MALE"),
            Self::Female => write!(f, "FEMALE"),
        }
    }
}

/// Age and gender of the patient a panel belongs to.
///
/// The gender is kept as submitted and only normalized when a gender-keyed
/// range is looked up, so a panel with no gender-keyed measurements never
/// fails on it. Construct this only after the boundary has applied its
/// defaulting policy; the validator never invents values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    /// Age in years
    pub age: f64,

    /// Gender as submitted
    pub gender: String,
}

impl Demographics {
    #[must_use]
    pub fn new(age: f64, gender: impl Into<String>) -> Self {
        Self {
            age,
            gender: gender.into(),
        }
    }

    /// Normalized gender.
    ///
    /// # Errors
    /// Returns `LimitError::UnknownGender` if the stored value is not recognised.
    pub fn gender(&self) -> Result<Gender, LimitError> {
        Gender::parse(&self.gender)
    }
}
