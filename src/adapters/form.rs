//! Form boundary: raw submitted fields to domain values.
//!
//! Submitted forms carry lab values under `<NAME>_status` keys plus optional
//! `age` and `gender`. What happens when age or gender is missing is an
//! explicit [`DemographicsPolicy`] chosen by the caller; the domain layer
//! never fills them in.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Demographics, LabPanel, Measurement, FORM_FIELD_SUFFIX};

pub const AGE_FIELD: &str = "age";
pub const GENDER_FIELD: &str = "gender";

/// Errors raised while reading submitted form fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Field {field} is not a valid number: {value:?}")]
    InvalidNumber { field: String, value: String },

    #[error("Required field missing: {0}")]
    MissingField(&'static str),
}

/// How to treat a submission that omits age or gender.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum DemographicsPolicy {
    /// Missing age or gender is an error.
    #[default]
    Require,
    /// Missing values are replaced by the given defaults.
    DefaultTo { age: f64, gender: String },
}

impl DemographicsPolicy {
    /// Defaults historically applied by the web form: age 30, male.
    #[must_use]
    pub fn legacy() -> Self {
        Self::DefaultTo {
            age: 30.0,
            gender: "M".to_string(),
        }
    }
}

fn non_blank<'a>(fields: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn parse_number(field: &str, raw: &str) -> Result<f64, FormError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FormError::InvalidNumber {
            field: field.to_string(),
            value: raw.to_string(),
        })
}

/// Read whichever lab values are present.
///
/// Absent keys are skipped. A present key whose value is blank or not a
/// finite number is rejected.
///
/// # Errors
/// Returns `FormError::InvalidNumber` for the first bad lab value in training order.
pub fn parse_panel(fields: &HashMap<String, String>) -> Result<LabPanel, FormError> {
    let mut panel = LabPanel::new();
    for measurement in Measurement::ALL {
        if let Some(raw) = fields.get(measurement.form_field()) {
            panel.insert(measurement, parse_number(measurement.form_field(), raw)?);
        }
    }

    for key in fields.keys() {
        if key.ends_with(FORM_FIELD_SUFFIX) && key.parse::<Measurement>().is_err() {
            tracing::debug!("Ignoring unrecognised lab field {:?}", key);
        }
    }

    Ok(panel)
}

/// Read age and gender, applying `policy` to missing values.
///
/// Blank values count as missing. A present age must be a finite,
/// non-negative number. Gender is passed through unnormalized; the range
/// validator rejects unknown values only when it needs them.
///
/// # Errors
/// `MissingField` under `Require`, `InvalidNumber` for a bad age.
pub fn parse_demographics(
    fields: &HashMap<String, String>,
    policy: &DemographicsPolicy,
) -> Result<Demographics, FormError> {
    let age = match non_blank(fields, AGE_FIELD) {
        Some(raw) => {
            let age = parse_number(AGE_FIELD, raw)?;
            if age < 0.0 {
                return Err(FormError::InvalidNumber {
                    field: AGE_FIELD.to_string(),
                    value: raw.to_string(),
                });
            }
            age
        }
        None => match policy {
            DemographicsPolicy::Require => return Err(FormError::MissingField(AGE_FIELD)),
            DemographicsPolicy::DefaultTo { age, .. } => {
                tracing::debug!("Age missing, defaulting to {}", age);
                *age
            }
        },
    };

    let gender = match non_blank(fields, GENDER_FIELD) {
        Some(raw) => raw.to_string(),
        None => match policy {
            DemographicsPolicy::Require => return Err(FormError::MissingField(GENDER_FIELD)),
            DemographicsPolicy::DefaultTo { gender, .. } => {
                tracing::debug!("Gender missing, defaulting to {}", gender);
                gender.clone()
            }
        },
    };

    Ok(Demographics::new(age, gender))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_parse_partial_panel() {
        let f = fields(&[
            ("MCV_status", "85"),
            ("HAEMATOCRIT_status", " 40.5 "),
            ("GLUCOSE_status", "5"),
            ("age", "25"),
        ]);
        let panel = parse_panel(&f).expect("valid");
        assert_eq!(panel.len(), 2);
        assert_eq!(panel.get(Measurement::Haematocrit), Some(40.5));
        assert_eq!(panel.get(Measurement::Mcv), Some(85.0));
    }

    #[test]
    fn test_parse_panel_rejects_non_numeric() {
        let f = fields(&[("MCH_status", "thirty")]);
        assert_eq!(
            parse_panel(&f),
            Err(FormError::InvalidNumber {
                field: "MCH_status".into(),
                value: "thirty".into()
            })
        );
        assert!(parse_panel(&fields(&[("MCH_status", "")])).is_err());
        assert!(parse_panel(&fields(&[("MCH_status", "NaN")])).is_err());
    }

    #[test]
    fn test_require_policy() {
        let err = parse_demographics(&fields(&[("gender", "F")]), &DemographicsPolicy::Require)
            .expect_err("age required");
        assert_eq!(err, FormError::MissingField(AGE_FIELD));

        let err = parse_demographics(&fields(&[("age", "40")]), &DemographicsPolicy::Require)
            .expect_err("gender required");
        assert_eq!(err, FormError::MissingField(GENDER_FIELD));

        let demo = parse_demographics(
            &fields(&[("age", "40"), ("gender", "f")]),
            &DemographicsPolicy::Require,
        )
        .expect("complete");
        assert_eq!(demo, Demographics::new(40.0, "f"));
    }

    #[test]
    fn test_legacy_defaults() {
        let demo = parse_demographics(&fields(&[]), &DemographicsPolicy::legacy())
            .expect("defaults apply");
        assert_eq!(demo, Demographics::new(30.0, "M"));

        let demo = parse_demographics(
            &fields(&[("age", " "), ("gender", "F")]),
            &DemographicsPolicy::legacy(),
        )
        .expect("blank age defaults");
        assert_eq!(demo, Demographics::new(30.0, "F"));
    }

    #[test]
    fn test_rejects_negative_or_bad_age() {
        for bad in ["-1", "abc", "inf"] {
            let result = parse_demographics(
                &fields(&[("age", bad), ("gender", "M")]),
                &DemographicsPolicy::legacy(),
            );
            assert!(matches!(result, Err(FormError::InvalidNumber { .. })), "{bad}");
        }
    }

    #[test]
    fn test_gender_passes_through_unnormalized() {
        let demo = parse_demographics(
            &fields(&[("age", "40"), ("gender", "X")]),
            &DemographicsPolicy::Require,
        )
        .expect("gender checked later");
        assert_eq!(demo.gender, "X");
    }
}
