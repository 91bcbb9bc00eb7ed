//! Lab panels and the classifier's feature vector.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::measurement::Measurement;

/// Lab values submitted for one patient.
///
/// Any subset of the eight measurements may be present. Iteration is in
/// training order regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabPanel {
    values: BTreeMap<Measurement, f64>,
}

impl LabPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, measurement: Measurement, value: f64) -> Self {
        self.insert(measurement, value);
        self
    }

    /// Set a value, returning the previous one.
    pub fn insert(&mut self, measurement: Measurement, value: f64) -> Option<f64> {
        self.values.insert(measurement, value)
    }

    pub fn remove(&mut self, measurement: Measurement) -> Option<f64> {
        self.values.remove(&measurement)
    }

    #[must_use]
    pub fn get(&self, measurement: Measurement) -> Option<f64> {
        self.values.get(&measurement).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Present measurements in training order.
    pub fn iter(&self) -> impl Iterator<Item = (Measurement, f64)> + '_ {
        self.values.iter().map(|(m, v)| (*m, *v))
    }
}

impl FromIterator<(Measurement, f64)> for LabPanel {
    fn from_iter<I: IntoIterator<Item = (Measurement, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Number of features the classifier was trained on.
pub const FEATURE_COUNT: usize = Measurement::ALL.len();

/// Fixed-order numeric encoding of a complete panel:
/// HAEMATOCRIT, HAEMOGLOBINS, ERYTHROCYTE, LEUCOCYTE, THROMBOCYTE, MCH, MCHC, MCV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    #[must_use]
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn get(&self, measurement: Measurement) -> f64 {
        self.0[measurement.index()]
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_iterates_in_training_order() {
        let panel = LabPanel::new()
            .with(Measurement::Mcv, 85.0)
            .with(Measurement::Haematocrit, 40.0)
            .with(Measurement::Leucocyte, 6.0);

        let order: Vec<Measurement> = panel.iter().map(|(m, _)| m).collect();
        assert_eq!(
            order,
            vec![Measurement::Haematocrit, Measurement::Leucocyte, Measurement::Mcv]
        );
        assert_eq!(panel.len(), 3);
    }

    #[test]
    fn test_insert_replaces() {
        let mut panel = LabPanel::new();
        assert_eq!(panel.insert(Measurement::Mch, 30.0), None);
        assert_eq!(panel.insert(Measurement::Mch, 31.0), Some(30.0));
        assert_eq!(panel.get(Measurement::Mch), Some(31.0));
        assert_eq!(panel.remove(Measurement::Mch), Some(31.0));
        assert!(panel.is_empty());
    }

    #[test]
    fn test_feature_vector_indexing() {
        let v = FeatureVector::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert!((v.get(Measurement::Haematocrit) - 1.0).abs() < f64::EPSILON);
        assert!((v.get(Measurement::Mcv) - 8.0).abs() < f64::EPSILON);
        assert_eq!(v.as_slice().len(), FEATURE_COUNT);
    }
}
