//! Result normalizer: reconciles remote and fallback outputs into one
//! [`PresentableResult`].
//!
//! This is the only place a `PresentableResult` is built, so it owns the
//! invariants: score in `0..=95`, BMI rounded to one decimal, recommendations
//! non-empty and at most four.

use crate::domain::{
    round_one_decimal, Metrics, PresentableResult, RemotePrediction, RiskLevel, Source,
    MAX_RISK_SCORE,
};

use super::scorer::FallbackScore;

/// Notice attached to every fallback result.
pub const OFFLINE_NOTICE: &str = "Note: Using offline prediction mode.";

/// Display cap for recommendations.
pub const MAX_RECOMMENDATIONS: usize = 4;

/// Substituted when the remote service omits recommendations.
pub const DEFAULT_RECOMMENDATIONS: [&str; MAX_RECOMMENDATIONS] = [
    "Maintain a balanced diet",
    "Regular physical activity",
    "Regular health check-ups",
    "Adequate sleep & rest",
];

/// A raw result tagged with the path that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawAssessment {
    Remote(RemotePrediction),
    Fallback(FallbackScore),
}

/// Normalize a raw result for presentation.
///
/// `metrics` supplies the BMI when the remote service does not report one.
#[must_use]
pub fn normalize(raw: RawAssessment, metrics: &Metrics) -> PresentableResult {
    match raw {
        RawAssessment::Remote(remote) => normalize_remote(remote, metrics),
        RawAssessment::Fallback(fallback) => normalize_fallback(fallback),
    }
}

fn normalize_remote(remote: RemotePrediction, metrics: &Metrics) -> PresentableResult {
    let risk_score = clamp_score(remote.risk_score);
    let risk_level = remote
        .risk_level
        .unwrap_or_else(|| RiskLevel::classify(risk_score));
    let bmi = round_one_decimal(remote.bmi.unwrap_or_else(|| metrics.bmi()));

    let recommendations = match remote.recommendations {
        Some(recs) if !recs.is_empty() => recs.into_iter().take(MAX_RECOMMENDATIONS).collect(),
        _ => default_recommendations(),
    };

    PresentableResult {
        risk_score,
        risk_level,
        bmi,
        risk_factors: remote.risk_factors.unwrap_or_default(),
        recommendations,
        message: remote.message.filter(|m| !m.trim().is_empty()),
        source: Source::Remote,
        assessed_at: chrono::Utc::now(),
    }
}

fn normalize_fallback(fallback: FallbackScore) -> PresentableResult {
    let risk_score = fallback.risk_score.min(MAX_RISK_SCORE);

    let mut recommendations: Vec<String> = fallback
        .recommendations
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .collect();
    if recommendations.is_empty() {
        recommendations = default_recommendations();
    }

    PresentableResult {
        risk_score,
        risk_level: RiskLevel::classify(risk_score),
        bmi: round_one_decimal(fallback.bmi),
        risk_factors: fallback.risk_factors,
        recommendations,
        message: Some(OFFLINE_NOTICE.to_string()),
        source: Source::Fallback,
        assessed_at: chrono::Utc::now(),
    }
}

/// Round a remote percentage to an integer inside `0..=MAX_RISK_SCORE`.
fn clamp_score(score: f64) -> u8 {
    if !score.is_finite() {
        return 0;
    }
    // Clamped into 0..=95 first, so the cast cannot truncate.
    score.round().clamp(0.0, f64::from(MAX_RISK_SCORE)) as u8
}

fn default_recommendations() -> Vec<String> {
    DEFAULT_RECOMMENDATIONS
        .iter()
        .map(|r| (*r).to_string())
        .collect()
}
