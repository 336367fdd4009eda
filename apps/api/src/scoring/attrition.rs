//! Attrition prediction: pluggable, trait-based predictor of how likely a
//! candidate is to leave.
//!
//! Default: no predictor (risk 0.0). With `ATTRITION_MODEL_PATH` set, a
//! `LogisticAttritionModel` is loaded once at startup and carried in
//! `AppState` as `Arc<dyn AttritionPredictor>`.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::scoring::normalizer::{as_real, profile_field};

/// Number of inputs the model was trained on.
pub const FEATURE_COUNT: usize = 9;

/// Feature keys in model order, as (snake_case, PascalCase) spellings.
const FEATURE_KEYS: [(&str, &str); FEATURE_COUNT] = [
    ("age", "Age"),
    ("job_satisfaction", "JobSatisfaction"),
    ("environment_satisfaction", "EnvironmentSatisfaction"),
    ("monthly_income", "MonthlyIncome"),
    ("years_at_company", "YearsAtCompany"),
    ("distance_from_home", "DistanceFromHome"),
    ("work_life_balance", "WorkLifeBalance"),
    ("education", "Education"),
    ("job_involvement", "JobInvolvement"),
];

#[derive(Debug, Error)]
pub enum AttritionError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    InvalidModel(String),

    #[error("model produced a non-finite probability")]
    NonFinite,
}

/// HR feature vector consumed by the attrition model, in training order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttritionFeatures(pub [f64; FEATURE_COUNT]);

impl AttritionFeatures {
    /// Reads the nine features from a candidate payload. Returns `None`
    /// unless every feature is present and numeric.
    pub fn from_candidate(candidate: &Value) -> Option<Self> {
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, (snake, pascal)) in values.iter_mut().zip(FEATURE_KEYS) {
            let raw = profile_field(candidate, snake).or_else(|| profile_field(candidate, pascal))?;
            *slot = as_real(raw)?;
        }
        Some(Self(values))
    }
}

/// The attrition predictor trait. Implement this to swap models without
/// touching the scoring or ranking code.
pub trait AttritionPredictor: Send + Sync {
    fn predict(&self, features: &AttritionFeatures) -> Result<f64, AttritionError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LogisticAttritionModel: standard scaler + logistic regression
// ────────────────────────────────────────────────────────────────────────────

/// Exported model artifact: scaler statistics and regression parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticAttritionModel {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticAttritionModel {
    pub fn load(path: &Path) -> Result<Self, AttritionError> {
        let raw = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&raw)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), AttritionError> {
        for (name, len) in [
            ("mean", self.mean.len()),
            ("scale", self.scale.len()),
            ("coefficients", self.coefficients.len()),
        ] {
            if len != FEATURE_COUNT {
                return Err(AttritionError::InvalidModel(format!(
                    "{name} has {len} entries, expected {FEATURE_COUNT}"
                )));
            }
        }
        if self.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err(AttritionError::InvalidModel(
                "scale entries must be finite and non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl AttritionPredictor for LogisticAttritionModel {
    fn predict(&self, features: &AttritionFeatures) -> Result<f64, AttritionError> {
        let logit = features
            .0
            .iter()
            .zip(&self.mean)
            .zip(&self.scale)
            .zip(&self.coefficients)
            .fold(self.intercept, |acc, (((x, mean), scale), coef)| {
                acc + coef * (x - mean) / scale
            });

        let probability = 1.0 / (1.0 + (-logit).exp());
        if !probability.is_finite() {
            return Err(AttritionError::NonFinite);
        }
        Ok(probability.clamp(0.0, 1.0))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resolution
// ────────────────────────────────────────────────────────────────────────────

/// Attrition probability for a candidate: an explicit
/// `attrition_probability` on the payload, else the predictor's output, else
/// 0.0. Prediction failures are logged and fall back to 0.0.
pub fn resolve_attrition(candidate: &Value, predictor: Option<&dyn AttritionPredictor>) -> f64 {
    if let Some(explicit) = profile_field(candidate, "attrition_probability").and_then(as_real) {
        return explicit;
    }

    let (Some(predictor), Some(features)) = (predictor, AttritionFeatures::from_candidate(candidate))
    else {
        return 0.0;
    };

    match predictor.predict(&features) {
        Ok(probability) => probability,
        Err(e) => {
            warn!(error = %e, "attrition prediction failed, assuming zero risk");
            0.0
        }
    }
}
