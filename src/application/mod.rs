//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! range validation and triage prediction.

mod assessment;
mod features;
mod prediction;
mod validation;
mod worker;

pub use assessment::{Assessment, AssessmentReport, AssessmentService};
pub use features::{FeatureAssembler, IncompletePanelError};
pub use prediction::{ClassifierSlot, PredictionError, PredictionPipeline};
pub use validation::{RangeValidator, ValidationInputError};
pub use worker::{PredictionProgress, PredictionWorker, PredictionWorkerHandle};
