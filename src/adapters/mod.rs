//! Adapters layer: Concrete implementations of ports and boundaries.
//!
//! - `linear_svm`: classifier loaded from the exported JSON model artifact
//! - `form`: submitted form fields to domain values, with an explicit
//!   demographics defaulting policy

pub mod form;
pub mod linear_svm;

pub use form::{DemographicsPolicy, FormError};
pub use linear_svm::{load_classifier, LinearSvmClassifier};
