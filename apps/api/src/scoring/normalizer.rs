//! Feature Normalizer: turns loosely-structured candidate/job JSON into
//! fully-populated `ScoringFeatures`.
//!
//! Every function here is total: any JSON input yields a value, falling back
//! to defaults where a field is absent, falsy, or of an unexpected type.

use serde_json::Value;

use crate::scoring::fitment::ScoringFeatures;
use crate::scoring::skills::{skill_match, SkillSet};

/// Default for cultural_fit, growth_potential and resume_quality.
pub const DEFAULT_SCALAR: f64 = 0.5;

/// Separators accepted when a skill field arrives as free text.
const SKILL_TEXT_SEPARATORS: &[char] = &[',', ';', '\n', '|'];

/// Normalizes a candidate payload against a job payload.
pub fn normalize(candidate: &Value, job: &Value) -> ScoringFeatures {
    normalize_against(candidate, &required_skills(job))
}

/// Normalizes a candidate payload against an already-resolved required-skill set.
pub fn normalize_against(candidate: &Value, required: &SkillSet) -> ScoringFeatures {
    let candidate_skills = candidate_skills(candidate);

    ScoringFeatures {
        skill_match: skill_match(required, &candidate_skills),
        experience_years: experience_years(candidate),
        cultural_fit: scalar_feature(candidate, "cultural_fit"),
        growth_potential: scalar_feature(candidate, "growth_potential"),
        resume_quality: scalar_feature(candidate, "resume_quality"),
        attrition_probability: 0.0,
    }
}

/// Required skills: `skills_required`, else `skills`, else empty.
pub fn required_skills(job: &Value) -> SkillSet {
    first_non_empty_skill_set(&[job.get("skills_required"), job.get("skills")])
}

/// Candidate skills: `skills`, else `skills_text`, else empty. The first
/// non-empty source wins; sources are never merged.
pub fn candidate_skills(candidate: &Value) -> SkillSet {
    first_non_empty_skill_set(&[
        profile_field(candidate, "skills"),
        profile_field(candidate, "skills_text"),
    ])
}

/// Years of experience from `experience_years`, else `experience`.
pub fn experience_years(candidate: &Value) -> u32 {
    let raw = profile_field(candidate, "experience_years")
        .filter(|v| is_truthy(v))
        .or_else(|| profile_field(candidate, "experience"));

    raw.map(parse_experience).unwrap_or(0)
}

/// Parses an experience value. Numbers are floored; text yields its first run
/// of digits; anything else is 0.
pub fn parse_experience(value: &Value) -> u32 {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u32::try_from(u).unwrap_or(u32::MAX)
            } else if let Some(f) = n.as_f64() {
                if f.is_finite() && f > 0.0 {
                    f.floor().min(u32::MAX as f64) as u32
                } else {
                    0
                }
            } else {
                0
            }
        }
        Value::String(text) => first_digit_run(text)
            .and_then(|digits| digits.parse::<u32>().ok())
            .unwrap_or(0),
        _ => 0,
    }
}

/// A [0,1] feature, or `DEFAULT_SCALAR` when absent, falsy, or not numeric.
/// Out-of-range values are passed through unchanged.
pub fn scalar_feature(candidate: &Value, key: &str) -> f64 {
    profile_field(candidate, key)
        .filter(|v| is_truthy(v))
        .and_then(as_real)
        .unwrap_or(DEFAULT_SCALAR)
}

/// Looks a field up on the candidate itself, then on its nested `profile`.
pub fn profile_field<'a>(candidate: &'a Value, key: &str) -> Option<&'a Value> {
    candidate
        .get(key)
        .filter(|v| !v.is_null())
        .or_else(|| {
            candidate
                .get("profile")
                .and_then(|p| p.get(key))
                .filter(|v| !v.is_null())
        })
}

/// Casts a JSON value to a finite real number.
pub fn as_real(value: &Value) -> Option<f64> {
    let real = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    real.filter(|r| r.is_finite())
}

fn first_non_empty_skill_set(sources: &[Option<&Value>]) -> SkillSet {
    sources
        .iter()
        .flatten()
        .map(|v| skill_set(v))
        .find(|set| !set.is_empty())
        .unwrap_or_default()
}

/// Case-folds and trims every skill, dropping empties. Accepts a JSON array of
/// strings or a delimited string.
fn skill_set(value: &Value) -> SkillSet {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(clean_skill)
            .collect(),
        Value::String(text) => text.split(SKILL_TEXT_SEPARATORS).filter_map(clean_skill).collect(),
        _ => SkillSet::new(),
    }
}

fn clean_skill(raw: &str) -> Option<String> {
    let skill = raw.trim().to_lowercase();
    (!skill.is_empty()).then_some(skill)
}

fn first_digit_run(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_experience_text_takes_first_number() {
        assert_eq!(parse_experience(&json!("3 years of work")), 3);
        assert_eq!(parse_experience(&json!("about 12 yrs, 4 in lead roles")), 12);
    }

    #[test]
    fn test_experience_text_without_digits_is_zero() {
        assert_eq!(parse_experience(&json!("several years")), 0);
        assert_eq!(parse_experience(&json!("")), 0);
    }

    #[test]
    fn test_experience_integer_passes_through() {
        assert_eq!(parse_experience(&json!(7)), 7);
    }

    #[test]
    fn test_experience_float_is_floored() {
        assert_eq!(parse_experience(&json!(4.9)), 4);
        assert_eq!(parse_experience(&json!(-2)), 0);
    }

    #[test]
    fn test_experience_overflowing_digits_is_zero() {
        assert_eq!(parse_experience(&json!("99999999999999999999 years")), 0);
    }

    #[test]
    fn test_experience_prefers_experience_years_field() {
        let candidate = json!({ "profile": { "experience_years": 5, "experience": "2 years" } });
        assert_eq!(experience_years(&candidate), 5);

        let falsy = json!({ "profile": { "experience_years": 0, "experience": "2 years" } });
        assert_eq!(experience_years(&falsy), 2);
    }

    #[test]
    fn test_skills_are_case_folded_and_trimmed() {
        let candidate = json!({ "profile": { "skills": ["  Rust ", "SQL", "", "   ", 42] } });
        let skills = candidate_skills(&candidate);
        assert_eq!(skills.len(), 2);
        assert!(skills.contains("rust"));
        assert!(skills.contains("sql"));
    }

    #[test]
    fn test_skills_text_is_fallback_only() {
        let only_text = json!({ "skills": [], "skills_text": ["Go", "Docker"] });
        assert!(candidate_skills(&only_text).contains("go"));

        let both = json!({ "skills": ["Rust"], "skills_text": ["Go"] });
        let skills = candidate_skills(&both);
        assert!(skills.contains("rust"));
        assert!(!skills.contains("go"));
    }

    #[test]
    fn test_free_text_skills_are_split() {
        let candidate = json!({ "skills_text": "Rust, PostgreSQL; Kubernetes" });
        let skills = candidate_skills(&candidate);
        assert_eq!(skills.len(), 3);
        assert!(skills.contains("postgresql"));
    }

    #[test]
    fn test_required_skills_fallback_order() {
        assert!(required_skills(&json!({ "skills_required": ["Rust"], "skills": ["Go"] }))
            .contains("rust"));
        assert!(required_skills(&json!({ "skills_required": [], "skills": ["Go"] }))
            .contains("go"));
        assert!(required_skills(&json!({})).is_empty());
    }

    #[test]
    fn test_scalar_defaults() {
        let candidate = json!({ "profile": { "cultural_fit": 0.8, "growth_potential": 0, "resume_quality": "bad" } });
        assert_eq!(scalar_feature(&candidate, "cultural_fit"), 0.8);
        assert_eq!(scalar_feature(&candidate, "growth_potential"), DEFAULT_SCALAR);
        assert_eq!(scalar_feature(&candidate, "resume_quality"), DEFAULT_SCALAR);
        assert_eq!(scalar_feature(&candidate, "missing"), DEFAULT_SCALAR);
    }

    #[test]
    fn test_scalar_accepts_numeric_strings() {
        let candidate = json!({ "cultural_fit": "0.75" });
        assert_eq!(scalar_feature(&candidate, "cultural_fit"), 0.75);
    }

    #[test]
    fn test_top_level_fields_win_over_profile() {
        let candidate = json!({ "skills": ["Rust"], "profile": { "skills": ["Java"] } });
        assert!(candidate_skills(&candidate).contains("rust"));
    }

    #[test]
    fn test_garbage_input_yields_defaults() {
        for payload in [json!(null), json!(42), json!("candidate"), json!([1, 2, 3])] {
            let features = normalize(&payload, &payload);
            assert_eq!(features.skill_match, 0.0);
            assert_eq!(features.experience_years, 0);
            assert_eq!(features.cultural_fit, DEFAULT_SCALAR);
            assert_eq!(features.growth_potential, DEFAULT_SCALAR);
            assert_eq!(features.resume_quality, DEFAULT_SCALAR);
            assert_eq!(features.attrition_probability, 0.0);
        }
    }

    #[test]
    fn test_normalize_computes_skill_match() {
        let job = json!({ "skills_required": ["Rust", "SQL", "AWS", "Docker"] });
        let candidate = json!({ "profile": { "skills": ["rust", "docker", "figma"] } });
        let features = normalize(&candidate, &job);
        assert_eq!(features.skill_match, 50.0);
    }
}
