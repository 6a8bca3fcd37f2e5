//! Wire types for the remote prediction service.
//!
//! `POST /predict` takes a [`PredictionRequest`] and answers with a
//! [`RemotePrediction`]; `GET /health` answers with a [`ServiceHealth`].

use serde::{Deserialize, Serialize};

use super::assessment::RiskLevel;
use super::metrics::Metrics;

/// Request body for `POST /predict`.
///
/// Field names are the service's; values are copied from [`Metrics`]
/// verbatim except booleans, which are sent as 0/1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub age: u32,
    pub gender: u8,
    pub height: f64,
    pub weight: f64,
    pub ap_hi: u32,
    pub ap_lo: u32,
    pub cholesterol: u8,
    pub gluc: u8,
    pub smoke: u8,
    pub alco: u8,
    pub active: u8,
}

impl PredictionRequest {
    /// Project metrics onto the wire shape.
    #[must_use]
    pub fn build(metrics: &Metrics) -> Self {
        Self {
            age: metrics.age,
            gender: metrics.gender.code(),
            height: metrics.height_cm,
            weight: metrics.weight_kg,
            ap_hi: metrics.systolic_bp,
            ap_lo: metrics.diastolic_bp,
            cholesterol: metrics.cholesterol.code(),
            gluc: metrics.glucose.code(),
            smoke: u8::from(metrics.smoker),
            alco: u8::from(metrics.drinks_alcohol),
            active: u8::from(metrics.physically_active),
        }
    }
}

impl From<&Metrics> for PredictionRequest {
    fn from(metrics: &Metrics) -> Self {
        Self::build(metrics)
    }
}

/// Response body of `POST /predict`.
///
/// Only `risk_score` is mandatory; everything else is defaulted by the
/// normalizer when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePrediction {
    /// Probability of disease as a percentage (0-100)
    pub risk_score: f64,

    #[serde(default)]
    pub risk_level: Option<RiskLevel>,

    /// Binary class (0 = no CVD, 1 = CVD)
    #[serde(default)]
    pub prediction: Option<u8>,

    #[serde(default)]
    pub risk_factors: Option<Vec<String>>,

    #[serde(default)]
    pub recommendations: Option<Vec<String>>,

    #[serde(default)]
    pub bmi: Option<f64>,

    #[serde(default)]
    pub message: Option<String>,
}

impl RemotePrediction {
    /// Reject payloads that decode but cannot be presented.
    ///
    /// # Errors
    /// Returns a description of the first offending field.
    pub fn check(&self) -> Result<(), String> {
        if !self.risk_score.is_finite() || !(0.0..=100.0).contains(&self.risk_score) {
            return Err(format!("risk_score {} outside [0, 100]", self.risk_score));
        }
        if let Some(bmi) = self.bmi {
            if !bmi.is_finite() || bmi <= 0.0 {
                return Err(format!("bmi {bmi} is not a positive number"));
            }
        }
        if let Some(prediction) = self.prediction {
            if prediction > 1 {
                return Err(format!("prediction {prediction} is not 0 or 1"));
            }
        }
        Ok(())
    }
}

/// Response body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub scaler_loaded: bool,
    #[serde(default)]
    pub version: String,
}

impl ServiceHealth {
    /// Whether the service can answer predictions right now.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == "healthy" && self.model_loaded
    }
}
