//! Assessment state machine: one submission at a time, from questionnaire
//! to presentable result.
//!
//! ```text
//! Idle --submit--> Submitting --complete(Ok)--> Resolved (remote)
//!                            \--complete(Err)-> Resolved (fallback + advisory)
//!                             \-------------->  Failed   (metrics unusable)
//! any --reset--> Idle
//! ```
//!
//! Each submission is stamped with an [`Epoch`]. A completion is applied only
//! if its epoch is the one currently `Submitting`; `reset()` moves the machine
//! to a fresh epoch so that a late response from an abandoned request is
//! dropped instead of overwriting newer state.

use crate::domain::{Metrics, PredictionRequest, PresentableResult, RemotePrediction};
use crate::ports::{PredictorError, RiskPredictor};
use crate::CardioError;

use super::normalizer::{normalize, RawAssessment};
use super::scorer;

/// Identity of one submission cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Epoch(u64);

impl std::fmt::Display for Epoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ticket returned by [`AssessmentMachine::submit`]: the caller performs the
/// network call for `request` and reports back with `epoch`.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub epoch: Epoch,
    pub request: PredictionRequest,
}

/// Non-fatal banner recorded when the remote path failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    /// Text for the banner
    pub message: String,
    /// The failure that triggered the fallback
    pub cause: PredictorError,
}

impl From<PredictorError> for Advisory {
    fn from(cause: PredictorError) -> Self {
        Self {
            message: cause.advisory(),
            cause,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssessmentState {
    Idle,
    Submitting {
        epoch: Epoch,
        metrics: Metrics,
    },
    Resolved {
        result: PresentableResult,
        advisory: Option<Advisory>,
    },
    Failed {
        error: String,
        advisory: Option<Advisory>,
    },
}

impl AssessmentState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting { .. } => "submitting",
            Self::Resolved { .. } => "resolved",
            Self::Failed { .. } => "failed",
        }
    }
}

/// What [`AssessmentMachine::complete`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Remote result accepted
    Remote,
    /// Remote failed; local fallback result accepted
    Fallback,
    /// Metrics could not be scored locally either
    Failed,
    /// Outcome belonged to a superseded epoch and was dropped
    Stale,
}

/// Drives a single assessment cycle.
#[derive(Debug)]
pub struct AssessmentMachine {
    state: AssessmentState,
    next_epoch: u64,
}

impl Default for AssessmentMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessmentMachine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: AssessmentState::Idle,
            next_epoch: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> &AssessmentState {
        &self.state
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        matches!(self.state, AssessmentState::Submitting { .. })
    }

    /// Current result, if resolved.
    #[must_use]
    pub fn result(&self) -> Option<&PresentableResult> {
        match &self.state {
            AssessmentState::Resolved { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Banner for the current terminal state, if any.
    #[must_use]
    pub fn advisory(&self) -> Option<&Advisory> {
        match &self.state {
            AssessmentState::Resolved { advisory, .. } | AssessmentState::Failed { advisory, .. } => {
                advisory.as_ref()
            }
            _ => None,
        }
    }

    /// Start a submission.
    ///
    /// Only accepted from `Idle`. While a request is in flight, or while a
    /// result is displayed and has not been reset, the call is ignored and
    /// returns `None`; the caller must not issue a network call then.
    pub fn submit(&mut self, metrics: Metrics) -> Option<Submission> {
        if !matches!(self.state, AssessmentState::Idle) {
            tracing::debug!(state = self.state.name(), "Ignoring submit outside idle state");
            return None;
        }

        self.next_epoch += 1;
        let epoch = Epoch(self.next_epoch);
        let request = PredictionRequest::build(&metrics);

        tracing::info!(%epoch, "Assessment submitted");
        self.state = AssessmentState::Submitting { epoch, metrics };

        Some(Submission { epoch, request })
    }

    /// Apply the outcome of the network call for `epoch`.
    ///
    /// A remote failure never surfaces as `Failed`: the local scorer runs
    /// synchronously and the machine resolves with `Source::Fallback`, keeping
    /// the failure as an advisory. `Failed` is reserved for metrics the
    /// scorer cannot work with.
    pub fn complete(
        &mut self,
        epoch: Epoch,
        outcome: Result<RemotePrediction, PredictorError>,
    ) -> Completion {
        let metrics = match &self.state {
            AssessmentState::Submitting {
                epoch: current,
                metrics,
            } if *current == epoch => metrics.clone(),
            _ => {
                tracing::debug!(%epoch, state = self.state.name(), "Dropping stale completion");
                return Completion::Stale;
            }
        };

        match outcome {
            Ok(remote) => {
                let result = normalize(RawAssessment::Remote(remote), &metrics);
                tracing::info!(%epoch, level = %result.risk_level, "Assessment resolved remotely");
                self.state = AssessmentState::Resolved {
                    result,
                    advisory: None,
                };
                Completion::Remote
            }
            Err(cause) => {
                tracing::warn!(%epoch, error = %cause, "Remote prediction failed; using local fallback");
                let advisory = Advisory::from(cause);
                match fallback(&metrics) {
                    Ok(result) => {
                        tracing::info!(%epoch, level = %result.risk_level, "Assessment resolved via fallback");
                        self.state = AssessmentState::Resolved {
                            result,
                            advisory: Some(advisory),
                        };
                        Completion::Fallback
                    }
                    Err(e) => {
                        tracing::error!(%epoch, error = %e, "Fallback scoring failed");
                        self.state = AssessmentState::Failed {
                            error: e.to_string(),
                            advisory: Some(advisory),
                        };
                        Completion::Failed
                    }
                }
            }
        }
    }

    /// Return to `Idle`, discarding any result, banner or in-flight epoch.
    pub fn reset(&mut self) {
        if let AssessmentState::Submitting { epoch, .. } = &self.state {
            tracing::info!(%epoch, "Abandoning in-flight assessment");
        }
        self.state = AssessmentState::Idle;
    }

    /// Run one complete cycle synchronously against `predictor`.
    ///
    /// Returns `None` if the machine was not idle.
    pub fn assess<P>(&mut self, predictor: &P, metrics: Metrics) -> Option<Completion>
    where
        P: RiskPredictor + ?Sized,
    {
        let submission = self.submit(metrics)?;
        let outcome = predictor.predict(&submission.request);
        Some(self.complete(submission.epoch, outcome))
    }
}

/// Score locally, refusing metrics that never passed form validation.
fn fallback(metrics: &Metrics) -> crate::Result<PresentableResult> {
    metrics
        .validate()
        .map_err(|errors| CardioError::Validation(errors.join(", ")))?;
    Ok(normalize(
        RawAssessment::Fallback(scorer::score(metrics)),
        metrics,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::normalizer::OFFLINE_NOTICE;
    use crate::domain::{RiskLevel, ServiceHealth, Source};
    use crate::ports::UNREACHABLE_ADVISORY;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Predictor returning a canned outcome and counting calls.
    struct FakePredictor {
        outcome: Result<RemotePrediction, PredictorError>,
        calls: AtomicUsize,
        last_request: Mutex<Option<PredictionRequest>>,
    }

    impl FakePredictor {
        fn answering(outcome: Result<RemotePrediction, PredictorError>) -> Self {
            Self {
                outcome,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl RiskPredictor for FakePredictor {
        fn predict(&self, request: &PredictionRequest) -> Result<RemotePrediction, PredictorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.outcome.clone()
        }

        fn health(&self) -> Result<ServiceHealth, PredictorError> {
            Err(PredictorError::Network("not implemented".to_string()))
        }
    }

    fn remote_ok(score: f64) -> RemotePrediction {
        RemotePrediction {
            risk_score: score,
            risk_level: None,
            prediction: Some(1),
            risk_factors: Some(vec!["Smoking".to_string()]),
            recommendations: None,
            bmi: Some(24.2),
            message: Some("From the model".to_string()),
        }
    }

    fn refused() -> PredictorError {
        PredictorError::Network("connection refused".to_string())
    }

    #[test]
    fn test_starts_idle() {
        let machine = AssessmentMachine::new();
        assert_eq!(machine.state(), &AssessmentState::Idle);
        assert!(machine.result().is_none());
        assert!(machine.advisory().is_none());
    }

    #[test]
    fn test_remote_success_resolves() {
        let predictor = FakePredictor::answering(Ok(remote_ok(72.0)));
        let mut machine = AssessmentMachine::new();

        let completion = machine.assess(&predictor, Metrics::default());
        assert_eq!(completion, Some(Completion::Remote));

        let result = machine.result().expect("resolved");
        assert_eq!(result.source, Source::Remote);
        assert_eq!(result.risk_score, 72);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert!(machine.advisory().is_none());
        assert_eq!(predictor.calls(), 1);
        assert_eq!(
            predictor.last_request.lock().unwrap().clone(),
            Some(PredictionRequest::build(&Metrics::default()))
        );
    }

    #[test]
    fn test_transport_failure_falls_back() {
        let predictor = FakePredictor::answering(Err(refused()));
        let mut machine = AssessmentMachine::new();

        let completion = machine.assess(&predictor, Metrics::default());
        assert_eq!(completion, Some(Completion::Fallback));

        match machine.state() {
            AssessmentState::Resolved { result, advisory } => {
                assert_eq!(result.source, Source::Fallback);
                assert_eq!(result.message.as_deref(), Some(OFFLINE_NOTICE));
                let advisory = advisory.as_ref().expect("advisory recorded");
                assert_eq!(advisory.message, UNREACHABLE_ADVISORY);
                assert_eq!(advisory.cause, refused());
            }
            other => panic!("expected resolved, got {other:?}"),
        }
    }

    #[test]
    fn test_service_failure_falls_back() {
        let predictor = FakePredictor::answering(Err(PredictorError::Service {
            status: Some(503),
            detail: "Model not loaded".to_string(),
        }));
        let mut machine = AssessmentMachine::new();

        assert_eq!(
            machine.assess(&predictor, Metrics::default()),
            Some(Completion::Fallback)
        );
        assert!(machine.advisory().expect("advisory").message.contains("503"));
    }

    #[test]
    fn test_invalid_metrics_fail_only_on_fallback_path() {
        let broken = Metrics {
            height_cm: 0.0,
            ..Default::default()
        };

        let mut machine = AssessmentMachine::new();
        let predictor = FakePredictor::answering(Err(refused()));
        assert_eq!(machine.assess(&predictor, broken), Some(Completion::Failed));
        assert!(matches!(machine.state(), AssessmentState::Failed { .. }));
        assert!(machine.advisory().is_some());
        assert!(machine.result().is_none());
    }

    #[test]
    fn test_submit_while_submitting_is_ignored() {
        let predictor = FakePredictor::answering(Ok(remote_ok(20.0)));
        let mut machine = AssessmentMachine::new();

        let first = machine.submit(Metrics::default()).expect("accepted");
        assert!(machine.is_submitting());
        assert!(machine.submit(Metrics::default()).is_none());

        // The caller only drives the network for accepted tickets.
        let outcome = predictor.predict(&first.request);
        assert_eq!(machine.complete(first.epoch, outcome), Completion::Remote);
        assert_eq!(predictor.calls(), 1);

        // Second `assess` while resolved is ignored too; no extra call.
        assert_eq!(machine.assess(&predictor, Metrics::default()), None);
        assert_eq!(predictor.calls(), 1);
    }

    #[test]
    fn test_reset_clears_result() {
        let predictor = FakePredictor::answering(Err(refused()));
        let mut machine = AssessmentMachine::new();
        machine.assess(&predictor, Metrics::default());
        assert!(machine.result().is_some());

        machine.reset();
        assert_eq!(machine.state(), &AssessmentState::Idle);
        assert!(machine.result().is_none());
        assert!(machine.advisory().is_none());
    }

    #[test]
    fn test_stale_completion_after_reset_is_dropped() {
        let mut machine = AssessmentMachine::new();
        let abandoned = machine.submit(Metrics::default()).expect("accepted");
        machine.reset();

        let current = machine.submit(Metrics::default()).expect("accepted");
        assert_ne!(abandoned.epoch, current.epoch);

        assert_eq!(
            machine.complete(abandoned.epoch, Ok(remote_ok(90.0))),
            Completion::Stale
        );
        assert!(machine.is_submitting());

        assert_eq!(
            machine.complete(current.epoch, Err(refused())),
            Completion::Fallback
        );
        assert_eq!(machine.result().map(|r| r.source), Some(Source::Fallback));
    }

    #[test]
    fn test_completion_without_submission_is_stale() {
        let mut machine = AssessmentMachine::new();
        assert_eq!(machine.complete(Epoch(7), Err(refused())), Completion::Stale);
        assert_eq!(machine.state(), &AssessmentState::Idle);
    }

    #[test]
    fn test_epochs_increase() {
        let mut machine = AssessmentMachine::new();
        let a = machine.submit(Metrics::default()).expect("accepted").epoch;
        machine.reset();
        let b = machine.submit(Metrics::default()).expect("accepted").epoch;
        assert!(b > a);
        assert_eq!(b.to_string(), "#2");
    }
}
