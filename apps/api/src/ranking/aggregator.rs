//! Ranking Aggregator: scores every application for a job, upserts each
//! score, and orders the results.
//!
//! Algorithm:
//! 1. Resolve the job's required skills once.
//! 2. For each row, through a bounded stream: score, then lookup → patch/insert.
//!    A malformed row scores 0.0 with an empty breakdown and is not persisted.
//! 3. Stable sort by score, descending. `buffered` keeps arrival order, so
//!    tied candidates stay in the order the store listed them.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{ApplicationRow, CandidateRow};
use crate::scoring::attrition::AttritionPredictor;
use crate::scoring::evaluate;
use crate::scoring::fitment::{Breakdown, FitmentResult};
use crate::scoring::normalizer::required_skills;
use crate::scoring::skills::SkillSet;
use crate::state::AppState;
use crate::store::{upsert_score, ApplicationStore};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// One entry of a ranking response.
#[derive(Debug, Clone, Serialize)]
pub struct RankedResult {
    pub candidate_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub fitment_score: f64,
    pub sub_scores: Breakdown,
}

/// Why a single application could not be scored.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("application {0} has no candidate")]
    MissingCandidate(String),

    #[error("application {application_id} has a malformed candidate: {reason}")]
    MalformedCandidate {
        application_id: String,
        reason: String,
    },

    #[error("application {0} has no candidate id")]
    MissingCandidateId(String),
}

/// A successfully scored row, before persistence.
#[derive(Debug, Clone)]
pub struct ScoredRow {
    pub candidate_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub result: FitmentResult,
}

impl From<ScoredRow> for RankedResult {
    fn from(row: ScoredRow) -> Self {
        Self {
            candidate_id: row.candidate_id,
            display_name: row.display_name,
            email: row.email,
            fitment_score: row.result.final_score,
            sub_scores: row.result.breakdown,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Row scoring (pure)
// ────────────────────────────────────────────────────────────────────────────

/// Scores one application row against the job's required skills.
pub fn score_row(
    row: &ApplicationRow,
    required: &SkillSet,
    predictor: Option<&dyn AttritionPredictor>,
) -> Result<ScoredRow, RowError> {
    let payload = row
        .candidates
        .as_ref()
        .filter(|c| !c.is_null())
        .ok_or_else(|| RowError::MissingCandidate(row.id.clone()))?;

    let candidate: CandidateRow =
        serde_json::from_value(payload.clone()).map_err(|e| RowError::MalformedCandidate {
            application_id: row.id.clone(),
            reason: e.to_string(),
        })?;

    let candidate_id = row
        .candidate_id
        .clone()
        .or(candidate.id)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| RowError::MissingCandidateId(row.id.clone()))?;

    Ok(ScoredRow {
        candidate_id,
        display_name: candidate.display_name,
        email: candidate.email,
        result: evaluate(payload, required, predictor),
    })
}

/// The result recorded for a row that failed to score.
fn failed_result(row: &ApplicationRow) -> RankedResult {
    let embedded = |key: &str| {
        row.candidates
            .as_ref()
            .and_then(|c| c.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let failed = FitmentResult::failed();

    RankedResult {
        candidate_id: row
            .candidate_id
            .clone()
            .or_else(|| embedded("id"))
            .unwrap_or_default(),
        display_name: embedded("display_name"),
        email: embedded("email"),
        fitment_score: failed.final_score,
        sub_scores: failed.breakdown,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Ranker
// ────────────────────────────────────────────────────────────────────────────

/// Ranks candidates for a job against an application store.
#[derive(Clone)]
pub struct Ranker {
    store: Arc<dyn ApplicationStore>,
    predictor: Option<Arc<dyn AttritionPredictor>>,
    concurrency: usize,
}

impl Ranker {
    pub fn new(
        store: Arc<dyn ApplicationStore>,
        predictor: Option<Arc<dyn AttritionPredictor>>,
        concurrency: usize,
    ) -> Self {
        Self {
            store,
            predictor,
            concurrency: concurrency.max(1),
        }
    }

    /// Ranking reads jobs and applications, so it needs a configured store.
    pub fn from_state(state: &AppState) -> Result<Self, AppError> {
        let store = state.store.clone().ok_or(AppError::StoreNotConfigured)?;
        Ok(Self::new(store, state.predictor.clone(), state.rank_concurrency))
    }

    /// Loads the job (unless supplied inline) and its applications, then ranks them.
    pub async fn rank_job(
        &self,
        job_id: &str,
        inline_job: Option<&Value>,
    ) -> Result<Vec<RankedResult>, AppError> {
        let job = match inline_job.filter(|j| j.is_object()) {
            Some(job) => job.clone(),
            None => self
                .store
                .fetch_job(job_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?
                .to_payload(),
        };

        let rows = self.store.list_applications(job_id).await?;
        Ok(self.rank(job_id, &job, rows).await)
    }

    /// Scores, persists and orders `rows`. Never fails: bad rows score 0.0 and
    /// store failures are logged.
    pub async fn rank(
        &self,
        job_id: &str,
        job: &Value,
        rows: Vec<ApplicationRow>,
    ) -> Vec<RankedResult> {
        let worker = RowWorker {
            store: Arc::clone(&self.store),
            predictor: self.predictor.clone(),
            job_id: Arc::from(job_id),
            required: Arc::new(required_skills(job)),
        };

        let total = rows.len();
        let outcomes: Vec<RowOutcome> = stream::iter(rows)
            .map(move |row| worker.clone().process(row))
            .buffered(self.concurrency)
            .collect()
            .await;

        let failed = outcomes.iter().filter(|o| o.failed).count();
        let unsaved = outcomes.iter().filter(|o| !o.persisted && !o.failed).count();
        let mut results: Vec<RankedResult> = outcomes.into_iter().map(|o| o.ranked).collect();

        // sort_by is stable
        results.sort_by(|a, b| b.fitment_score.total_cmp(&a.fitment_score));

        info!(job_id, total, failed, unsaved, "ranked candidates");
        results
    }
}

struct RowOutcome {
    ranked: RankedResult,
    failed: bool,
    persisted: bool,
}

/// Owned per-row context, so each row's future is independent of the caller.
#[derive(Clone)]
struct RowWorker {
    store: Arc<dyn ApplicationStore>,
    predictor: Option<Arc<dyn AttritionPredictor>>,
    job_id: Arc<str>,
    required: Arc<SkillSet>,
}

impl RowWorker {
    async fn process(self, row: ApplicationRow) -> RowOutcome {
        let scored = match score_row(&row, &self.required, self.predictor.as_deref()) {
            Ok(scored) => scored,
            Err(e) => {
                warn!(job_id = %self.job_id, error = %e, "skipping malformed application");
                return RowOutcome {
                    ranked: failed_result(&row),
                    failed: true,
                    persisted: false,
                };
            }
        };

        let persisted = match upsert_score(
            self.store.as_ref(),
            &self.job_id,
            &scored.candidate_id,
            &scored.result,
        )
        .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    job_id = %self.job_id,
                    candidate_id = %scored.candidate_id,
                    error = %e,
                    "failed to persist fitment score"
                );
                false
            }
        };

        RowOutcome {
            ranked: scored.into(),
            failed: false,
            persisted,
        }
    }
}
