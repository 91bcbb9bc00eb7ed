//! Range validation: flags panel values outside their reference ranges.

use crate::domain::{
    expected_kind, Demographics, LabPanel, LimitError, LimitKind, Measurement,
    ReferenceLimitTable, Warning,
};

/// A demographics value or table inconsistency prevented a range check.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Cannot check {measurement}: {source}")]
pub struct ValidationInputError {
    pub measurement: Measurement,
    #[source]
    pub source: LimitError,
}

impl ValidationInputError {
    /// True when the table itself is at fault rather than the submitted input.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        match &self.source {
            LimitError::UnknownMeasurement(_) | LimitError::InvalidTable(_) => true,
            LimitError::AgeOutOfTableDomain { age, .. } => *age >= 0.0,
            LimitError::UnknownGender(_) => false,
        }
    }
}

/// Checks a (possibly partial) panel against a reference table.
#[derive(Debug, Clone, Copy)]
pub struct RangeValidator<'t> {
    table: &'t ReferenceLimitTable,
}

impl RangeValidator<'static> {
    /// Validator over the canonical table.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(ReferenceLimitTable::standard())
    }
}

impl Default for RangeValidator<'static> {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'t> RangeValidator<'t> {
    #[must_use]
    pub fn new(table: &'t ReferenceLimitTable) -> Self {
        Self { table }
    }

    /// Produce one warning per out-of-range value.
    ///
    /// Missing measurements are skipped. Warnings come back in measurement
    /// declaration order, HAEMATOCRIT first, independent of how the panel
    /// was filled. Both range ends count as normal.
    ///
    /// # Errors
    /// Returns `ValidationInputError` for the first measurement whose range
    /// cannot be resolved (unknown gender, age outside every band).
    pub fn validate(
        &self,
        panel: &LabPanel,
        demographics: &Demographics,
    ) -> Result<Vec<Warning>, ValidationInputError> {
        let mut warnings = Vec::new();

        for measurement in Measurement::ALL {
            let Some(value) = panel.get(measurement) else {
                continue;
            };

            let range = match expected_kind(measurement) {
                LimitKind::AgeBanded => self
                    .table
                    .lookup_age_banded(measurement, demographics.age),
                LimitKind::GenderKeyed => self
                    .table
                    .lookup_gender_keyed(measurement, &demographics.gender),
            }
            .map_err(|source| ValidationInputError {
                measurement,
                source,
            })?;

            if !range.contains(value) {
                warnings.push(Warning::new(measurement, range));
            }
        }

        tracing::debug!(
            "Validated {} measurements, {} out of range",
            panel.len(),
            warnings.len()
        );

        Ok(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReferenceRange;

    fn adult_male() -> Demographics {
        Demographics::new(25.0, "M")
    }

    #[test]
    fn test_empty_panel_has_no_warnings() {
        let warnings = RangeValidator::standard()
            .validate(&LabPanel::new(), &adult_male())
            .expect("empty panel validates");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let v = RangeValidator::standard();
        for value in [12.5, 16.7] {
            let panel = LabPanel::new().with(Measurement::Haemoglobins, value);
            assert!(v.validate(&panel, &adult_male()).expect("ok").is_empty());
        }
        for value in [12.5 - 1e-9, 16.7 + 1e-9] {
            let panel = LabPanel::new().with(Measurement::Haemoglobins, value);
            let warnings = v.validate(&panel, &adult_male()).expect("ok");
            assert_eq!(
                warnings,
                vec![Warning::new(Measurement::Haemoglobins, ReferenceRange::new(12.5, 16.7))]
            );
        }
    }

    fn assert_bounds_inclusive(
        v: &RangeValidator<'_>,
        measurement: Measurement,
        demo: &Demographics,
        range: ReferenceRange,
    ) {
        let eps = 1e-9;
        for value in [range.low, range.high] {
            let panel = LabPanel::new().with(measurement, value);
            let warnings = v.validate(&panel, demo).expect("ok");
            assert!(warnings.is_empty(), "{measurement} {value} at {demo:?}");
        }
        for value in [range.low - eps, range.high + eps] {
            let panel = LabPanel::new().with(measurement, value);
            let warnings = v.validate(&panel, demo).expect("ok");
            assert_eq!(
                warnings,
                vec![Warning::new(measurement, range)],
                "{measurement} {value} at {demo:?}"
            );
        }
    }

    #[test]
    fn test_bounds_inclusive_for_every_gender_keyed_measurement() {
        let v = RangeValidator::standard();
        let cases = [
            (Measurement::Haemoglobins, (12.5, 16.7), (12.0, 15.6)),
            (Measurement::Erythrocyte, (4.1, 6.0), (4.0, 5.3)),
            (Measurement::Leucocyte, (4.56, 10.3), (4.56, 10.3)),
            (Measurement::Thrombocyte, (159.0, 391.0), (159.0, 391.0)),
            (Measurement::Mch, (28.0, 32.0), (28.0, 32.0)),
            (Measurement::Mchc, (33.0, 37.0), (33.0, 37.0)),
            (Measurement::Mcv, (75.0, 96.0), (75.0, 96.0)),
        ];
        for (m, (ml, mh), (fl, fh)) in cases {
            let male = Demographics::new(40.0, "M");
            let female = Demographics::new(40.0, "F");
            assert_bounds_inclusive(&v, m, &male, ReferenceRange::new(ml, mh));
            assert_bounds_inclusive(&v, m, &female, ReferenceRange::new(fl, fh));
        }
    }

    #[test]
    fn test_bounds_inclusive_for_every_haematocrit_band() {
        let v = RangeValidator::standard();
        let bands = [
            (0.0, (45.0, 62.0)),
            (0.5, (45.0, 62.0)),
            (1.0, (30.0, 44.0)),
            (3.0, (32.0, 41.0)),
            (8.0, (36.0, 42.0)),
            (25.0, (30.0, 44.0)),
        ];
        for (age, (low, high)) in bands {
            for gender in ["M", "F"] {
                let demo = Demographics::new(age, gender);
                let range = ReferenceRange::new(low, high);
                assert_bounds_inclusive(&v, Measurement::Haematocrit, &demo, range);
            }
        }
    }

    #[test]
    fn test_first_birthday_switches_haematocrit_band() {
        let v = RangeValidator::standard();
        let panel = LabPanel::new().with(Measurement::Haematocrit, 50.0);

        let infant = v.validate(&panel, &Demographics::new(0.999, "F")).expect("ok");
        assert!(infant.is_empty());

        let toddler = v.validate(&panel, &Demographics::new(1.0, "F")).expect("ok");
        assert_eq!(
            toddler,
            vec![Warning::new(Measurement::Haematocrit, ReferenceRange::new(30.0, 44.0))]
        );
    }

    #[test]
    fn test_haematocrit_uses_age_band() {
        let v = RangeValidator::standard();
        let panel = LabPanel::new().with(Measurement::Haematocrit, 50.0);

        // Infant band (45, 62) accepts 50.
        assert!(v
            .validate(&panel, &Demographics::new(0.5, "F"))
            .expect("ok")
            .is_empty());

        // Adult band (30, 44) rejects it.
        let warnings = v.validate(&panel, &adult_male()).expect("ok");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].measurement, Measurement::Haematocrit);
        assert!((warnings[0].low - 30.0).abs() < f64::EPSILON);
        assert!((warnings[0].high - 44.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_gender_selects_range() {
        let v = RangeValidator::standard();
        let panel = LabPanel::new().with(Measurement::Erythrocyte, 5.8);
        assert!(v.validate(&panel, &Demographics::new(40.0, "m")).expect("ok").is_empty());
        let warnings = v.validate(&panel, &Demographics::new(40.0, "f")).expect("ok");
        assert_eq!(warnings.len(), 1);
        assert!((warnings[0].high - 5.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_gender_only_fails_when_needed() {
        let v = RangeValidator::standard();
        let demo = Demographics::new(25.0, "X");

        let haematocrit_only = LabPanel::new().with(Measurement::Haematocrit, 40.0);
        assert!(v.validate(&haematocrit_only, &demo).expect("no gender lookup").is_empty());

        let with_mcv = haematocrit_only.with(Measurement::Mcv, 85.0);
        let err = v.validate(&with_mcv, &demo).expect_err("gender required");
        assert_eq!(err.measurement, Measurement::Mcv);
        assert_eq!(err.source, LimitError::UnknownGender("X".to_string()));
        assert!(!err.is_internal());
    }

    #[test]
    fn test_negative_age_is_not_silently_defaulted() {
        let panel = LabPanel::new().with(Measurement::Haematocrit, 40.0);
        let err = RangeValidator::standard()
            .validate(&panel, &Demographics::new(-3.0, "M"))
            .expect_err("negative age has no band");
        assert!(matches!(err.source, LimitError::AgeOutOfTableDomain { .. }));
    }

    #[test]
    fn test_non_finite_value_is_flagged() {
        let panel = LabPanel::new().with(Measurement::Mch, f64::NAN);
        let warnings = RangeValidator::standard()
            .validate(&panel, &adult_male())
            .expect("ok");
        assert_eq!(warnings.len(), 1);
    }
}
