//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a medical-themed interface for:
//! - Entering the health questionnaire
//! - Watching the submission while the service responds
//! - Reading the risk assessment (remote or offline)

mod app;
mod styles;
mod ui;
mod worker;

pub use app::App;
pub use styles::MedicalTheme;
pub use worker::{HealthCheckHandle, PredictionProgress, PredictionWorker, PredictionWorkerHandle};
