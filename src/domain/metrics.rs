//! Patient metrics for cardiovascular risk assessment.
//!
//! Mirrors the questionnaire fields of the cardio dataset the remote model
//! was trained on (age, anthropometrics, blood pressure, lab categories and
//! lifestyle flags).

use serde::{Deserialize, Serialize};

/// Biological sex as encoded by the remote model (1 = female, 2 = male).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Gender {
    #[default]
    Female,
    Male,
}

impl Gender {
    /// Wire code.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Female => 1,
            Self::Male => 2,
        }
    }

    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Female),
            2 => Some(Self::Male),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
        }
    }
}

/// Ordinal lab category used for both cholesterol and glucose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Level {
    #[default]
    Normal,
    AboveNormal,
    WellAboveNormal,
}

impl Level {
    /// Wire code (1..=3).
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Normal => 1,
            Self::AboveNormal => 2,
            Self::WellAboveNormal => 3,
        }
    }

    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Normal),
            2 => Some(Self::AboveNormal),
            3 => Some(Self::WellAboveNormal),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::AboveNormal => "Above Normal",
            Self::WellAboveNormal => "Well Above Normal",
        }
    }
}

/// One patient's questionnaire answers.
///
/// Treated as immutable once handed to the assessment state machine: the
/// machine takes it by value and never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Age in years (18-100)
    pub age: u32,

    pub gender: Gender,

    /// Height in cm (100-250)
    pub height_cm: f64,

    /// Weight in kg (30-200)
    pub weight_kg: f64,

    /// Systolic blood pressure in mmHg (80-200), `ap_hi` on the wire
    pub systolic_bp: u32,

    /// Diastolic blood pressure in mmHg (50-150), `ap_lo` on the wire
    pub diastolic_bp: u32,

    pub cholesterol: Level,

    pub glucose: Level,

    pub smoker: bool,

    pub drinks_alcohol: bool,

    pub physically_active: bool,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            age: 45,
            gender: Gender::Female,
            height_cm: 170.0,
            weight_kg: 70.0,
            systolic_bp: 120,
            diastolic_bp: 80,
            cholesterol: Level::Normal,
            glucose: Level::Normal,
            smoker: false,
            drinks_alcohol: false,
            physically_active: true,
        }
    }
}

/// Accepted input ranges, inclusive.
pub const AGE_RANGE: (u32, u32) = (18, 100);
pub const HEIGHT_RANGE: (f64, f64) = (100.0, 250.0);
pub const WEIGHT_RANGE: (f64, f64) = (30.0, 200.0);
pub const SYSTOLIC_RANGE: (u32, u32) = (80, 200);
pub const DIASTOLIC_RANGE: (u32, u32) = (50, 150);

impl Metrics {
    /// Unrounded body-mass index (kg/m²).
    #[must_use]
    pub fn bmi(&self) -> f64 {
        let height_m = self.height_cm / 100.0;
        self.weight_kg / (height_m * height_m)
    }

    /// Validate that all metrics are within the questionnaire's ranges.
    ///
    /// # Errors
    /// Returns every violated constraint as a human-readable string.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(AGE_RANGE.0..=AGE_RANGE.1).contains(&self.age) {
            errors.push(format!(
                "Age {} out of range [{}, {}]",
                self.age, AGE_RANGE.0, AGE_RANGE.1
            ));
        }
        if !self.height_cm.is_finite() || !(HEIGHT_RANGE.0..=HEIGHT_RANGE.1).contains(&self.height_cm) {
            errors.push(format!(
                "Height {} cm out of range [{}, {}]",
                self.height_cm, HEIGHT_RANGE.0, HEIGHT_RANGE.1
            ));
        }
        if !self.weight_kg.is_finite() || !(WEIGHT_RANGE.0..=WEIGHT_RANGE.1).contains(&self.weight_kg) {
            errors.push(format!(
                "Weight {} kg out of range [{}, {}]",
                self.weight_kg, WEIGHT_RANGE.0, WEIGHT_RANGE.1
            ));
        }
        if !(SYSTOLIC_RANGE.0..=SYSTOLIC_RANGE.1).contains(&self.systolic_bp) {
            errors.push(format!(
                "Systolic BP {} out of range [{}, {}]",
                self.systolic_bp, SYSTOLIC_RANGE.0, SYSTOLIC_RANGE.1
            ));
        }
        if !(DIASTOLIC_RANGE.0..=DIASTOLIC_RANGE.1).contains(&self.diastolic_bp) {
            errors.push(format!(
                "Diastolic BP {} out of range [{}, {}]",
                self.diastolic_bp, DIASTOLIC_RANGE.0, DIASTOLIC_RANGE.1
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Round to one decimal place, half away from zero.
#[must_use]
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
