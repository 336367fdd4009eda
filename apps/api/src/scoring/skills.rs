//! Skill Matcher: overlap between a job's required skills and a candidate's skills.

use std::collections::HashSet;

/// A set of case-folded, trimmed, non-empty skill names.
pub type SkillSet = HashSet<String>;

/// Percentage (0–100) of `required` skills present in `candidate`.
///
/// Either set being empty scores 0.0: an unmeasurable match is never treated
/// as a full match. The denominator is always the required-skill count, so
/// extra candidate skills neither help nor hurt.
pub fn skill_match(required: &SkillSet, candidate: &SkillSet) -> f64 {
    if required.is_empty() || candidate.is_empty() {
        return 0.0;
    }

    let overlap = required.intersection(candidate).count();
    let denominator = required.len().max(1);

    (overlap as f64 / denominator as f64) * 100.0
}
