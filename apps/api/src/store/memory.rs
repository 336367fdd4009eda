//! In-memory `ApplicationStore` for tests, with write counters and failure
//! injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{ApplicationStore, StoreError};
use crate::models::{ApplicationRecord, ApplicationRow, JobRow, NewApplication, ScorePatch};

#[derive(Default)]
pub struct InMemoryStore {
    jobs: Mutex<HashMap<String, JobRow>>,
    candidates: Mutex<HashMap<String, Value>>,
    applications: Mutex<Vec<ApplicationRecord>>,
    raw_rows: Mutex<Vec<(String, ApplicationRow)>>,
    inserts: AtomicUsize,
    patches: AtomicUsize,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl InMemoryStore {
    pub fn add_job(&self, job: Value) {
        let row: JobRow = serde_json::from_value(job).expect("job fixture must have an id");
        self.jobs.lock().unwrap().insert(row.id.clone(), row);
    }

    pub fn add_candidate(&self, candidate: Value) {
        let id = candidate["id"]
            .as_str()
            .expect("candidate fixture must have an id")
            .to_string();
        self.candidates.lock().unwrap().insert(id, candidate);
    }

    /// Creates an application with no score yet.
    pub fn seed_application(&self, job_id: &str, candidate_id: &str) -> ApplicationRecord {
        let record = ApplicationRecord {
            id: Uuid::new_v4().to_string(),
            job_id: Some(job_id.to_string()),
            candidate_id: Some(candidate_id.to_string()),
            status: Some("applied".to_string()),
            fitment_score: None,
            sub_scores: None,
            created_at: Some(Utc::now()),
        };
        self.applications.lock().unwrap().push(record.clone());
        record
    }

    /// Lists `row` verbatim for `job_id`, bypassing the candidate join.
    pub fn add_raw_row(&self, job_id: &str, row: ApplicationRow) {
        self.raw_rows
            .lock()
            .unwrap()
            .push((job_id.to_string(), row));
    }

    pub fn records_for(&self, job_id: &str, candidate_id: &str) -> Vec<ApplicationRecord> {
        self.applications
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.job_id.as_deref() == Some(job_id) && r.candidate_id.as_deref() == Some(candidate_id)
            })
            .cloned()
            .collect()
    }

    pub fn application_count(&self) -> usize {
        self.applications.lock().unwrap().len()
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn patch_count(&self) -> usize {
        self.patches.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check(&self, flag: &AtomicBool) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "store unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ApplicationStore for InMemoryStore {
    async fn fetch_job(&self, job_id: &str) -> Result<Option<JobRow>, StoreError> {
        self.check(&self.fail_reads)?;
        Ok(self.jobs.lock().unwrap().get(job_id).cloned())
    }

    async fn list_applications(&self, job_id: &str) -> Result<Vec<ApplicationRow>, StoreError> {
        self.check(&self.fail_reads)?;
        let candidates = self.candidates.lock().unwrap();
        let mut rows: Vec<ApplicationRow> = self
            .applications
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.job_id.as_deref() == Some(job_id))
            .map(|r| ApplicationRow {
                id: r.id.clone(),
                candidate_id: r.candidate_id.clone(),
                candidates: r
                    .candidate_id
                    .as_ref()
                    .and_then(|id| candidates.get(id).cloned()),
            })
            .collect();

        rows.extend(
            self.raw_rows
                .lock()
                .unwrap()
                .iter()
                .filter(|(job, _)| job == job_id)
                .map(|(_, row)| row.clone()),
        );
        Ok(rows)
    }

    async fn find_application(
        &self,
        job_id: &str,
        candidate_id: &str,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        self.check(&self.fail_reads)?;
        Ok(self.records_for(job_id, candidate_id).into_iter().next())
    }

    async fn patch_application(&self, id: &str, patch: &ScorePatch) -> Result<(), StoreError> {
        self.check(&self.fail_writes)?;
        let mut applications = self.applications.lock().unwrap();
        let record = applications
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::MissingRow)?;
        record.fitment_score = Some(patch.fitment_score);
        record.sub_scores = Some(json!(patch.sub_scores));
        self.patches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn insert_application(
        &self,
        application: &NewApplication,
    ) -> Result<ApplicationRecord, StoreError> {
        self.check(&self.fail_writes)?;
        let record = ApplicationRecord {
            id: Uuid::new_v4().to_string(),
            job_id: Some(application.job_id.clone()),
            candidate_id: Some(application.candidate_id.clone()),
            status: Some(application.status.clone()),
            fitment_score: Some(application.fitment_score),
            sub_scores: Some(json!(application.sub_scores)),
            created_at: Some(Utc::now()),
        };
        self.applications.lock().unwrap().push(record.clone());
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(record)
    }
}
