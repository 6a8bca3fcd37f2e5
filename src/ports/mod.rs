//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundary
//! between the assessment core and the remote prediction service.

mod predictor;

pub use predictor::{PredictorError, RiskPredictor, UNREACHABLE_ADVISORY};
