//! Fitment Scorer: weighted linear combination of normalized features.
//!
//! The final score rewards low attrition risk (`1 - risk`), while the breakdown
//! reports the raw risk percentage so a reader sees the actual risk.

use serde::ser::{Serialize, SerializeMap, Serializer};

pub const SKILL_MATCH_LABEL: &str = "Skill Match";
pub const CULTURAL_FIT_LABEL: &str = "Cultural Fit";
pub const GROWTH_POTENTIAL_LABEL: &str = "Growth Potential";
pub const ATTRITION_RISK_LABEL: &str = "Attrition Risk (lower is better)";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Fully populated scoring input. The normalizer fills every field with a
/// default, so the scorer never sees partial data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringFeatures {
    /// 0 – 100
    pub skill_match: f64,
    pub experience_years: u32,
    /// 0.0 – 1.0
    pub cultural_fit: f64,
    /// 0.0 – 1.0
    pub growth_potential: f64,
    /// 0.0 – 1.0
    pub resume_quality: f64,
    /// 0.0 – 1.0
    pub attrition_probability: f64,
}

impl ScoringFeatures {
    pub fn with_attrition(mut self, attrition_probability: f64) -> Self {
        self.attrition_probability = attrition_probability;
        self
    }
}

/// Fixed weights of the fitment formula. They sum to 1.0.
#[derive(Debug, Clone, Copy)]
pub struct FitmentWeights {
    pub skill_match: f64,
    pub cultural_fit: f64,
    pub growth_potential: f64,
    pub retention: f64,
}

impl Default for FitmentWeights {
    fn default() -> Self {
        Self {
            skill_match: 0.40,
            cultural_fit: 0.20,
            growth_potential: 0.25,
            retention: 0.15,
        }
    }
}

/// Named sub-scores, in insertion order, each a 2-decimal percentage.
///
/// Serializes as a JSON object whose key order matches insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Breakdown(Vec<(&'static str, f64)>);

impl Breakdown {
    /// The breakdown recorded for a candidate that could not be scored.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, label: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, value)| *value)
    }

    #[cfg(test)]
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(name, _)| *name)
    }
}

impl Serialize for Breakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, value) in &self.0 {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// Output of one scoring call.
#[derive(Debug, Clone, PartialEq)]
pub struct FitmentResult {
    /// 0 – 100, rounded to 2 decimals
    pub final_score: f64,
    pub breakdown: Breakdown,
}

impl FitmentResult {
    /// Zero score with an empty breakdown, used for rows that failed to score.
    pub fn failed() -> Self {
        Self {
            final_score: 0.0,
            breakdown: Breakdown::empty(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

/// Scores features with the default weights.
pub fn score(features: &ScoringFeatures) -> FitmentResult {
    score_with_weights(features, &FitmentWeights::default())
}

/// raw = w_skill * skill_fraction + w_culture * cultural_fit
///     + w_growth * growth_potential + w_retention * (1 - attrition)
pub fn score_with_weights(features: &ScoringFeatures, weights: &FitmentWeights) -> FitmentResult {
    let skill_fraction = features.skill_match / 100.0;
    let retention = 1.0 - features.attrition_probability;

    let raw = weights.skill_match * skill_fraction
        + weights.cultural_fit * features.cultural_fit
        + weights.growth_potential * features.growth_potential
        + weights.retention * retention;

    let breakdown = Breakdown(vec![
        (SKILL_MATCH_LABEL, round2(skill_fraction * 100.0)),
        (CULTURAL_FIT_LABEL, round2(features.cultural_fit * 100.0)),
        (GROWTH_POTENTIAL_LABEL, round2(features.growth_potential * 100.0)),
        // raw risk, not inverted
        (ATTRITION_RISK_LABEL, round2(features.attrition_probability * 100.0)),
    ]);

    FitmentResult {
        final_score: round2(raw * 100.0),
        breakdown,
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
