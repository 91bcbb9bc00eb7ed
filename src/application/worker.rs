//! Background prediction worker.
//!
//! Moves the classifier call off the caller's loop for hosts that must not
//! block. There is no cancellation; inference is short and runs to completion.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::domain::{LabPanel, TriageResult};

use super::features::FeatureAssembler;
use super::prediction::PredictionPipeline;

/// Progress updates from the prediction worker.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionProgress {
    /// Building the feature vector
    Assembling,
    /// Feature vector ready, classifier running
    Classifying,
    /// Prediction finished
    Complete(TriageResult),
    /// Assembly or classification failed
    Error(String),
}

impl PredictionProgress {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete(_) | Self::Error(_))
    }
}

/// Handle to a running prediction.
pub struct PredictionWorkerHandle {
    /// Receiver for progress updates
    pub progress_rx: Receiver<PredictionProgress>,
    handle: JoinHandle<()>,
}

impl PredictionWorkerHandle {
    /// Block until the worker reports a terminal state.
    ///
    /// # Errors
    /// Returns the worker's error message, or a note that the thread died.
    pub fn wait(self) -> Result<TriageResult, String> {
        let outcome = loop {
            match self.progress_rx.recv() {
                Ok(PredictionProgress::Complete(triage)) => break Ok(triage),
                Ok(PredictionProgress::Error(e)) => break Err(e),
                Ok(_) => continue,
                Err(_) => break Err("Prediction worker exited without a result".to_string()),
            }
        };
        let _ = self.handle.join();
        outcome
    }
}

/// Runs predictions on a background thread.
pub struct PredictionWorker;

impl PredictionWorker {
    /// Spawn a background prediction.
    ///
    /// Returns a handle to receive progress updates.
    pub fn spawn(pipeline: Arc<PredictionPipeline>, panel: LabPanel) -> PredictionWorkerHandle {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            Self::run_with_progress(&pipeline, &panel, &tx);
        });

        PredictionWorkerHandle {
            progress_rx: rx,
            handle,
        }
    }

    fn run_with_progress(
        pipeline: &PredictionPipeline,
        panel: &LabPanel,
        tx: &Sender<PredictionProgress>,
    ) {
        let _ = tx.send(PredictionProgress::Assembling);

        let features = match FeatureAssembler::assemble(panel) {
            Ok(f) => f,
            Err(e) => {
                let _ = tx.send(PredictionProgress::Error(e.to_string()));
                return;
            }
        };

        let _ = tx.send(PredictionProgress::Classifying);

        match pipeline.classify(&features) {
            Ok(triage) => {
                let _ = tx.send(PredictionProgress::Complete(triage));
            }
            Err(e) => {
                tracing::warn!("Background prediction failed: {}", e);
                let _ = tx.send(PredictionProgress::Error(e.to_string()));
            }
        }
    }
}
