//! Application store: the narrow persistence contract the scoring core needs.
//!
//! The pure scoring and ranking code never talks to the network directly; it
//! goes through `ApplicationStore`, so it can be exercised against
//! `memory::InMemoryStore` in tests.

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::models::application::STATUS_APPLIED;
use crate::models::{ApplicationRecord, ApplicationRow, JobRow, NewApplication, ScorePatch};
use crate::scoring::fitment::FitmentResult;

#[cfg(test)]
pub mod memory;
pub mod rest;

pub use rest::RestStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("store returned no row")]
    MissingRow,
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn fetch_job(&self, job_id: &str) -> Result<Option<JobRow>, StoreError>;

    /// All applications for a job, each joined with its candidate.
    async fn list_applications(&self, job_id: &str) -> Result<Vec<ApplicationRow>, StoreError>;

    /// Zero-or-one application for (job_id, candidate_id).
    async fn find_application(
        &self,
        job_id: &str,
        candidate_id: &str,
    ) -> Result<Option<ApplicationRecord>, StoreError>;

    async fn patch_application(&self, id: &str, patch: &ScorePatch) -> Result<(), StoreError>;

    async fn insert_application(
        &self,
        application: &NewApplication,
    ) -> Result<ApplicationRecord, StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Updated,
    Inserted,
}

/// Writes a score onto the application for (job_id, candidate_id), creating
/// the application with status "applied" if none exists.
///
/// The lookup completes before the write decision is made. Two concurrent
/// callers for the same pair can still both insert; the store's unique
/// constraint is the only guard against that.
pub async fn upsert_score(
    store: &dyn ApplicationStore,
    job_id: &str,
    candidate_id: &str,
    result: &FitmentResult,
) -> Result<UpsertOutcome, StoreError> {
    match store.find_application(job_id, candidate_id).await? {
        Some(existing) => {
            let patch = ScorePatch {
                fitment_score: result.final_score,
                sub_scores: result.breakdown.clone(),
            };
            store.patch_application(&existing.id, &patch).await?;
            debug!(job_id, candidate_id, application_id = %existing.id, "updated application score");
            Ok(UpsertOutcome::Updated)
        }
        None => {
            let application = NewApplication {
                job_id: job_id.to_string(),
                candidate_id: candidate_id.to_string(),
                status: STATUS_APPLIED.to_string(),
                fitment_score: result.final_score,
                sub_scores: result.breakdown.clone(),
            };
            let created = store.insert_application(&application).await?;
            debug!(job_id, candidate_id, application_id = %created.id, "created application");
            Ok(UpsertOutcome::Inserted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::InMemoryStore;
    use super::*;
    use crate::scoring::fitment::{score, ScoringFeatures};

    fn result() -> FitmentResult {
        score(&ScoringFeatures {
            skill_match: 50.0,
            experience_years: 3,
            cultural_fit: 0.5,
            growth_potential: 0.5,
            resume_quality: 0.5,
            attrition_probability: 0.0,
        })
    }

    #[tokio::test]
    async fn test_upsert_inserts_when_absent() {
        let store = InMemoryStore::default();
        let outcome = upsert_score(&store, "job-1", "cand-1", &result()).await.unwrap();

        assert_eq!(outcome, UpsertOutcome::Inserted);
        let records = store.records_for("job-1", "cand-1");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status.as_deref(), Some("applied"));
        assert_eq!(records[0].fitment_score, Some(result().final_score));
    }

    #[tokio::test]
    async fn test_upsert_patches_existing_row() {
        let store = InMemoryStore::default();
        let existing = store.seed_application("job-1", "cand-1");

        let outcome = upsert_score(&store, "job-1", "cand-1", &result()).await.unwrap();

        assert_eq!(outcome, UpsertOutcome::Updated);
        let records = store.records_for("job-1", "cand-1");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, existing.id);
        assert_eq!(records[0].fitment_score, Some(result().final_score));
        assert_eq!(store.insert_count(), 0);
    }

    #[tokio::test]
    async fn test_upsert_twice_never_duplicates() {
        let store = InMemoryStore::default();
        upsert_score(&store, "job-1", "cand-1", &result()).await.unwrap();
        upsert_score(&store, "job-1", "cand-1", &result()).await.unwrap();

        assert_eq!(store.records_for("job-1", "cand-1").len(), 1);
        assert_eq!(store.insert_count(), 1);
        assert_eq!(store.patch_count(), 1);
    }

    #[tokio::test]
    async fn test_upsert_surfaces_store_failure() {
        let store = InMemoryStore::default();
        store.fail_writes(true);
        let err = upsert_score(&store, "job-1", "cand-1", &result()).await.unwrap_err();
        assert!(matches!(err, StoreError::Status { .. }));
    }
}
