//! Background workers for non-blocking service calls.
//!
//! The blocking HTTP client must never run on the TUI thread: a slow or
//! unreachable service would freeze rendering for the whole request timeout.
//! Workers own a clone of the predictor and report over a channel that the
//! main loop drains with `try_recv`.
//!
//! Dropping a handle abandons the worker. Its final `send` then fails and is
//! ignored; the thread exits once the request returns.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::application::{Epoch, Submission};
use crate::domain::{RemotePrediction, ServiceHealth};
use crate::ports::{PredictorError, RiskPredictor};

/// Progress updates from the prediction worker.
#[derive(Debug, Clone)]
pub enum PredictionProgress {
    /// Request is on the wire
    Sending,
    /// Service answered (or failed) for the given submission
    Complete {
        epoch: Epoch,
        outcome: Result<RemotePrediction, PredictorError>,
    },
}

/// Handle to a running prediction worker.
pub struct PredictionWorkerHandle {
    /// Receiver for progress updates
    pub progress_rx: Receiver<PredictionProgress>,
    /// Submission this worker is serving
    pub epoch: Epoch,
    _handle: JoinHandle<()>,
}

impl PredictionWorkerHandle {
    /// Try to receive the next progress update (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<PredictionProgress> {
        self.progress_rx.try_recv().ok()
    }
}

/// Runs one `/predict` call off the UI thread.
pub struct PredictionWorker;

impl PredictionWorker {
    /// Spawn a background prediction for `submission`.
    pub fn spawn(
        predictor: Arc<dyn RiskPredictor>,
        submission: Submission,
    ) -> PredictionWorkerHandle {
        let (tx, rx) = mpsc::channel();
        let epoch = submission.epoch;

        let handle = thread::spawn(move || {
            Self::run_with_progress(predictor.as_ref(), submission, tx);
        });

        PredictionWorkerHandle {
            progress_rx: rx,
            epoch,
            _handle: handle,
        }
    }

    fn run_with_progress(
        predictor: &dyn RiskPredictor,
        submission: Submission,
        tx: Sender<PredictionProgress>,
    ) {
        let _ = tx.send(PredictionProgress::Sending);

        let outcome = predictor.predict(&submission.request);

        if tx
            .send(PredictionProgress::Complete {
                epoch: submission.epoch,
                outcome,
            })
            .is_err()
        {
            tracing::debug!(epoch = %submission.epoch, "Prediction finished after being abandoned");
        }
    }
}

/// Handle to a running `/health` check.
pub struct HealthCheckHandle {
    rx: Receiver<Result<ServiceHealth, PredictorError>>,
    _handle: JoinHandle<()>,
}

impl HealthCheckHandle {
    /// Spawn a single health check.
    pub fn spawn(predictor: Arc<dyn RiskPredictor>) -> Self {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            let _ = tx.send(predictor.health());
        });

        Self {
            rx,
            _handle: handle,
        }
    }

    /// Try to receive the health check result (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<Result<ServiceHealth, PredictorError>> {
        self.rx.try_recv().ok()
    }
}
