//! Local fallback scorer.
//!
//! A deterministic, additive rule set that stands in for the remote model
//! when the prediction service cannot be used. Pure and total: no I/O, no
//! randomness, same metrics in, same score out.

use crate::domain::{round_one_decimal, Level, Metrics, MAX_RISK_SCORE};

/// Starting point before any adjustment.
const BASE_RISK: i32 = 20;

/// Recommendations attached to every fallback result.
pub const FALLBACK_RECOMMENDATIONS: [&str; 4] = [
    "Schedule regular health check-ups",
    "Maintain a balanced diet",
    "Regular physical activity",
    "Monitor blood pressure",
];

/// Output of [`score`], before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackScore {
    pub risk_score: u8,
    /// Rounded to one decimal
    pub bmi: f64,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Score metrics with the local rule set.
///
/// Category predicates use the unrounded BMI; the reported BMI is rounded.
#[must_use]
pub fn score(metrics: &Metrics) -> FallbackScore {
    let raw_bmi = metrics.bmi();

    FallbackScore {
        risk_score: risk_score(metrics, raw_bmi),
        bmi: round_one_decimal(raw_bmi),
        risk_factors: risk_factors(metrics, raw_bmi),
        recommendations: FALLBACK_RECOMMENDATIONS
            .iter()
            .map(|r| (*r).to_string())
            .collect(),
    }
}

fn risk_score(metrics: &Metrics, bmi: f64) -> u8 {
    let mut risk = BASE_RISK;

    if metrics.age > 55 {
        risk += 20;
    } else if metrics.age > 45 {
        risk += 10;
    }

    if metrics.systolic_bp > 140 || metrics.diastolic_bp > 90 {
        risk += 15;
    }

    risk += match metrics.cholesterol {
        Level::WellAboveNormal => 15,
        Level::AboveNormal => 8,
        Level::Normal => 0,
    };

    risk += match metrics.glucose {
        Level::WellAboveNormal => 10,
        Level::AboveNormal => 5,
        Level::Normal => 0,
    };

    if bmi > 30.0 {
        risk += 10;
    } else if bmi > 25.0 {
        risk += 5;
    }

    if metrics.smoker {
        risk += 15;
    }
    if metrics.drinks_alcohol {
        risk += 5;
    }
    if !metrics.physically_active {
        risk += 10;
    }

    // Floor is unreachable (no negative adjustments) but keeps the cast total.
    u8::try_from(risk.clamp(0, i32::from(MAX_RISK_SCORE))).unwrap_or(MAX_RISK_SCORE)
}

/// Factors in canonical order; BMI category always last.
fn risk_factors(metrics: &Metrics, bmi: f64) -> Vec<String> {
    let checks = [
        (metrics.age > 55, "Age above 55"),
        (metrics.systolic_bp > 140, "High systolic blood pressure"),
        (metrics.diastolic_bp > 90, "High diastolic blood pressure"),
        (metrics.cholesterol == Level::WellAboveNormal, "High cholesterol level"),
        (metrics.glucose == Level::WellAboveNormal, "High glucose level"),
        (metrics.smoker, "Smoking"),
        (metrics.drinks_alcohol, "Alcohol consumption"),
        (!metrics.physically_active, "Physical inactivity"),
    ];

    let mut factors: Vec<String> = checks
        .iter()
        .filter(|(hit, _)| *hit)
        .map(|(_, label)| (*label).to_string())
        .collect();

    if bmi > 30.0 {
        factors.push("Obesity (BMI > 30)".to_string());
    } else if bmi > 25.0 {
        factors.push("Overweight (BMI > 25)".to_string());
    }

    factors
}
