//! Axum route handler for single-candidate scoring.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::scoring::evaluate_for_job;
use crate::scoring::fitment::Breakdown;
use crate::state::AppState;
use crate::store::upsert_score;

/// Warning attached to a score response whose result was not persisted.
pub const DB_UPSERT_FAILED: &str = "db_upsert_failed";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub job_id: Option<Value>,
    #[serde(default)]
    pub candidate_id: Option<Value>,
    #[serde(default)]
    pub job: Value,
    #[serde(default)]
    pub candidate: Value,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub fitment_score: f64,
    pub sub_scores: Breakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /score
///
/// Scores one candidate against one job and upserts the result onto the
/// (job_id, candidate_id) application. A failed or impossible write still
/// returns the score, flagged with `warning: "db_upsert_failed"`.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    let job_id = required_id(request.job_id.as_ref(), "job_id")?;
    let candidate_id = required_id(request.candidate_id.as_ref(), "candidate_id")?;

    let result = evaluate_for_job(&request.candidate, &request.job, state.predictor.as_deref());

    let warning = match state.store.as_deref() {
        Some(store) => match upsert_score(store, &job_id, &candidate_id, &result).await {
            Ok(_) => None,
            Err(e) => {
                warn!(%job_id, %candidate_id, error = %e, "failed to persist fitment score");
                Some(DB_UPSERT_FAILED)
            }
        },
        None => {
            warn!(%job_id, %candidate_id, "no application store configured, score not persisted");
            Some(DB_UPSERT_FAILED)
        }
    };

    info!(%job_id, %candidate_id, score = result.final_score, "scored candidate");

    Ok(Json(ScoreResponse {
        fitment_score: result.final_score,
        sub_scores: result.breakdown,
        warning,
    }))
}

/// Extracts a non-blank identifier. Numeric ids are accepted and stringified.
pub(crate) fn required_id(value: Option<&Value>, field: &str) -> Result<String, AppError> {
    let id = match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    if id.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(id)
}
