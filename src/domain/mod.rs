//! Domain layer: Core business types.
//!
//! Pure data types with no I/O. All types are serializable and the input
//! model carries its own range validation.

mod assessment;
mod metrics;
mod request;

pub use assessment::{PresentableResult, RiskLevel, Source, MAX_RISK_SCORE};
pub use metrics::{
    round_one_decimal, Gender, Level, Metrics, AGE_RANGE, DIASTOLIC_RANGE, HEIGHT_RANGE,
    SYSTOLIC_RANGE, WEIGHT_RANGE,
};
pub use request::{PredictionRequest, RemotePrediction, ServiceHealth};
