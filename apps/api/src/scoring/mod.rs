// Fitment scoring engine: normalize → match skills → resolve attrition → score.
// Everything except `handlers` is synchronous and free of I/O.

pub mod attrition;
pub mod fitment;
pub mod handlers;
pub mod normalizer;
pub mod skills;

use serde_json::Value;

use crate::scoring::attrition::{resolve_attrition, AttritionPredictor};
use crate::scoring::fitment::{score, FitmentResult};
use crate::scoring::normalizer::{normalize, normalize_against};
use crate::scoring::skills::SkillSet;

/// Scores one candidate against a job payload.
pub fn evaluate_for_job(
    candidate: &Value,
    job: &Value,
    predictor: Option<&dyn AttritionPredictor>,
) -> FitmentResult {
    let attrition = resolve_attrition(candidate, predictor);
    score(&normalize(candidate, job).with_attrition(attrition))
}

/// Scores one candidate against a resolved required-skill set.
pub fn evaluate(
    candidate: &Value,
    required: &SkillSet,
    predictor: Option<&dyn AttritionPredictor>,
) -> FitmentResult {
    let attrition = resolve_attrition(candidate, predictor);
    let features = normalize_against(candidate, required).with_attrition(attrition);
    score(&features)
}
