//! # hemotriage
//!
//! Hematology reference-range validation and inpatient/outpatient triage.
//!
//! This crate provides:
//! - Age-banded and gender-keyed reference ranges for an eight-value blood panel
//! - Range validation producing ordered, structured warnings
//! - Fixed-order feature assembly and classification through a pre-trained model
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (Measurement, LabPanel, ReferenceLimitTable, Warning)
//! - `ports`: Trait definitions for external collaborators (Classifier)
//! - `adapters`: Concrete implementations (JSON linear model, form boundary)
//! - `application`: Use cases orchestrating domain and ports
//! - `config`: Environment-driven runtime settings

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::{AssessmentService, FeatureAssembler, PredictionPipeline, RangeValidator};
pub use domain::{Demographics, LabPanel, Measurement, TriageResult, Warning};

/// Result type for hemotriage operations
pub type Result<T> = std::result::Result<T, HemotriageError>;

/// Errors reading a submission before it reaches the core.
///
/// Validation and prediction failures stay in their own typed results on
/// [`application::Assessment`] and are not folded in here.
#[derive(Debug, thiserror::Error)]
pub enum HemotriageError {
    #[error("Invalid form input: {0}")]
    Form(#[from] adapters::FormError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
