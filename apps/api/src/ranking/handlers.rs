use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::ranking::{RankedResult, Ranker};
use crate::scoring::handlers::required_id;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    #[serde(default)]
    pub job_id: Option<Value>,
    /// Inline job requirements; fetched from the store when absent.
    #[serde(default)]
    pub job: Option<Value>,
}

/// POST /rank
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> Result<Json<Vec<RankedResult>>, AppError> {
    let job_id = required_id(request.job_id.as_ref(), "job_id")?;
    let ranker = Ranker::from_state(&state)?;
    let results = ranker.rank_job(&job_id, request.job.as_ref()).await?;
    Ok(Json(results))
}
