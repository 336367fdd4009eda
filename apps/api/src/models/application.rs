use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::scoring::fitment::Breakdown;

/// Status given to application records the scorer creates.
pub const STATUS_APPLIED: &str = "applied";

/// A persisted application, keyed by (job_id, candidate_id).
///
/// The upsert path only reads `id`; the other columns are kept for callers
/// that inspect what the store holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(dead_code)]
pub struct ApplicationRecord {
    pub id: String,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub candidate_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub fitment_score: Option<f64>,
    #[serde(default)]
    pub sub_scores: Option<Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// An application joined with its candidate, as listed for a ranking run.
///
/// `candidates` stays untyped: a missing or malformed embed is a per-row
/// failure, not a failure of the whole listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRow {
    pub id: String,
    #[serde(default)]
    pub candidate_id: Option<String>,
    #[serde(default)]
    pub candidates: Option<Value>,
}

/// The identifying columns of an embedded candidate. The normalizer reads the
/// raw embed for everything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Partial update written onto an existing application.
#[derive(Debug, Clone, Serialize)]
pub struct ScorePatch {
    pub fitment_score: f64,
    pub sub_scores: Breakdown,
}

/// Body of a newly created application.
#[derive(Debug, Clone, Serialize)]
pub struct NewApplication {
    pub job_id: String,
    pub candidate_id: String,
    pub status: String,
    pub fitment_score: f64,
    pub sub_scores: Breakdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_application_row_tolerates_missing_embed() {
        let row: ApplicationRow =
            serde_json::from_value(json!({ "id": "app-1", "candidate_id": "cand-1" })).unwrap();
        assert!(row.candidates.is_none());
        assert_eq!(row.candidate_id.as_deref(), Some("cand-1"));
    }

    #[test]
    fn test_candidate_row_rejects_non_object() {
        let result = serde_json::from_value::<CandidateRow>(json!(["not", "a", "candidate"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_record_parses_store_timestamp() {
        let record: ApplicationRecord = serde_json::from_value(json!({
            "id": "app-1",
            "job_id": "job-1",
            "candidate_id": "cand-1",
            "status": "applied",
            "fitment_score": 72.5,
            "sub_scores": {},
            "created_at": "2024-03-01T10:15:00.123456+00:00"
        }))
        .unwrap();
        assert_eq!(record.fitment_score, Some(72.5));
        assert!(record.created_at.is_some());
    }
}
