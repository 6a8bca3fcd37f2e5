//! Application layer: the assessment core.
//!
//! - `scorer`: deterministic local fallback
//! - `normalizer`: remote/fallback reconciliation into a presentable result
//! - `assessment`: submission state machine

mod assessment;
mod normalizer;
mod scorer;

pub use assessment::{
    Advisory, AssessmentMachine, AssessmentState, Completion, Epoch, Submission,
};
pub use normalizer::{
    normalize, RawAssessment, DEFAULT_RECOMMENDATIONS, MAX_RECOMMENDATIONS, OFFLINE_NOTICE,
};
pub use scorer::{score, FallbackScore, FALLBACK_RECOMMENDATIONS};
