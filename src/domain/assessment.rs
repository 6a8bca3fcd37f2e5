//! Assessment result types.
//!
//! Represents the UI-ready outcome of either the remote model or the local
//! fallback scorer.

use serde::{Deserialize, Serialize};

/// Highest risk score a presentable result may carry.
pub const MAX_RISK_SCORE: u8 = 95;

/// Risk level classification for cardiovascular disease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Low risk of cardiovascular disease
    Low,
    /// Moderate risk, lifestyle changes advised
    Moderate,
    /// High risk, professional evaluation advised
    High,
}

impl RiskLevel {
    /// Classify a percentage score.
    ///
    /// Thresholds are strict: 30 is still low and 60 is still moderate.
    #[must_use]
    pub fn classify(score: u8) -> Self {
        if score > 60 {
            Self::High
        } else if score > 30 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - No significant indicators",
            Self::Moderate => "Moderate risk - Follow-up recommended",
            Self::High => "High risk - Professional evaluation advised",
        }
    }

    /// Advisory sentence shown when the result carries no message of its own.
    #[must_use]
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Low => "Great news! Your results indicate a lower risk of cardiovascular disease. Keep maintaining your healthy lifestyle!",
            Self::Moderate => "Your results show a moderate cardiovascular risk. Consider lifestyle improvements and regular health check-ups.",
            Self::High => "Your results indicate a higher risk of cardiovascular disease. We strongly recommend consulting with a healthcare professional for a comprehensive evaluation.",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Which computation path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Remote,
    Fallback,
}

/// Fully populated, UI-ready assessment.
///
/// Only `application::normalize` constructs these, so every field is set
/// regardless of which path produced the raw result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentableResult {
    /// Integer percentage in `0..=MAX_RISK_SCORE`
    pub risk_score: u8,

    pub risk_level: RiskLevel,

    /// Body-mass index rounded to one decimal
    pub bmi: f64,

    /// Contributing factors, in canonical check order
    pub risk_factors: Vec<String>,

    /// At most four recommendations
    pub recommendations: Vec<String>,

    /// Offline-mode notice or the remote service's commentary
    pub message: Option<String>,

    pub source: Source,

    /// When the result was produced (kept in memory only)
    pub assessed_at: chrono::DateTime<chrono::Utc>,
}

impl PresentableResult {
    /// Message to render: the result's own, or the level summary.
    #[must_use]
    pub fn display_message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| self.risk_level.summary())
    }

    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.source == Source::Fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(RiskLevel::classify(0), RiskLevel::Low);
        assert_eq!(RiskLevel::classify(30), RiskLevel::Low);
        assert_eq!(RiskLevel::classify(31), RiskLevel::Moderate);
        assert_eq!(RiskLevel::classify(60), RiskLevel::Moderate);
        assert_eq!(RiskLevel::classify(61), RiskLevel::High);
        assert_eq!(RiskLevel::classify(MAX_RISK_SCORE), RiskLevel::High);
    }

    #[test]
    fn test_risk_level_wire_labels() {
        let level: RiskLevel = serde_json::from_str("\"moderate\"").expect("should parse");
        assert_eq!(level, RiskLevel::Moderate);
        assert!(serde_json::from_str::<RiskLevel>("\"severe\"").is_err());
        assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"high\"");
    }

    #[test]
    fn test_display_message_falls_back_to_summary() {
        let mut result = PresentableResult {
            risk_score: 72,
            risk_level: RiskLevel::High,
            bmi: 27.1,
            risk_factors: vec![],
            recommendations: vec![],
            message: None,
            source: Source::Remote,
            assessed_at: chrono::Utc::now(),
        };
        assert_eq!(result.display_message(), RiskLevel::High.summary());

        result.message = Some("Model says hello".to_string());
        assert_eq!(result.display_message(), "Model says hello");
        assert!(!result.is_offline());
    }
}
