//! # CardioPredict
//!
//! Cardiovascular risk assessment engine with a terminal front end.
//!
//! This crate provides:
//! - A remote predictor client for the `/predict` model service
//! - A deterministic local fallback scorer used when the service is unavailable
//! - A submission state machine that turns either path into one presentable result
//! - Terminal UI for entering the questionnaire and reading the result
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (Metrics, PredictionRequest, PresentableResult)
//! - `ports`: Trait definitions for external operations (`RiskPredictor`)
//! - `adapters`: Concrete implementations (reqwest HTTP client, log sanitizer)
//! - `application`: Scorer, normalizer and assessment state machine
//! - `config`: Environment-driven settings
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use application::{AssessmentMachine, AssessmentState};
pub use domain::{Metrics, PresentableResult, RiskLevel, Source};
pub use ports::{PredictorError, RiskPredictor};

/// Result type for CardioPredict operations
pub type Result<T> = std::result::Result<T, CardioError>;

/// Main error type for CardioPredict
#[derive(Debug, thiserror::Error)]
pub enum CardioError {
    #[error("Invalid health metrics: {0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
