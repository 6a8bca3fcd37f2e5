//! Predictor port: Trait for the remote risk model.
//!
//! This trait abstracts the HTTP service from the assessment state machine,
//! which only needs "send one request, get one typed answer or a typed error".

use crate::domain::{PredictionRequest, RemotePrediction, ServiceHealth};

/// Banner shown when the service cannot be reached.
pub const UNREACHABLE_ADVISORY: &str =
    "Failed to connect to the prediction service. Please make sure the backend is running.";

/// Failure of a single exchange with the prediction service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictorError {
    /// Unreachable host, refused connection or timeout
    #[error("prediction service unreachable: {0}")]
    Network(String),

    /// The service answered, but not with a usable prediction
    #[error("prediction service error{}: {detail}", status_suffix(.status))]
    Service {
        /// HTTP status, if the failure was a non-2xx response
        status: Option<u16>,
        detail: String,
    },
}

impl PredictorError {
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// User-visible, non-fatal banner text for this failure.
    #[must_use]
    pub fn advisory(&self) -> String {
        match self {
            Self::Network(_) => UNREACHABLE_ADVISORY.to_string(),
            Self::Service {
                status: Some(status),
                ..
            } => format!("The prediction service reported an error (HTTP {status})."),
            Self::Service { status: None, .. } => {
                "The prediction service returned an unreadable response.".to_string()
            }
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Trait for remote risk prediction.
///
/// Implementations issue exactly one outbound call per invocation and never
/// retry or cache.
pub trait RiskPredictor: Send + Sync {
    /// Submit one prediction request.
    ///
    /// # Errors
    /// Returns `PredictorError::Network` if the service cannot be reached in
    /// time and `PredictorError::Service` on a non-2xx status or a payload
    /// that does not match the response schema.
    fn predict(&self, request: &PredictionRequest) -> Result<RemotePrediction, PredictorError>;

    /// Query the service's health endpoint.
    ///
    /// # Errors
    /// Same classification as [`RiskPredictor::predict`].
    fn health(&self) -> Result<ServiceHealth, PredictorError>;
}
