//! PostgREST adapter for the application store (Supabase-compatible).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::{ApplicationStore, StoreError};
use crate::config::StoreConfig;
use crate::models::{ApplicationRecord, ApplicationRow, JobRow, NewApplication, ScorePatch};

const REST_PREFIX: &str = "rest/v1";
// `candidates(*)` passes through whatever columns the candidates table has.
const APPLICATION_SELECT: &str = "id,candidate_id,candidates(*)";

#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    service_key: String,
}

impl RestStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.base_url, REST_PREFIX, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = self.authorized(request).send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout
            } else {
                StoreError::Transport(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }
        Ok(response)
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Vec<T>, StoreError> {
        let response = self.send(request).await?;
        // The client timeout also covers reading the body.
        response.json::<Vec<T>>().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout
            } else {
                StoreError::Decode(e.to_string())
            }
        })
    }
}

#[async_trait]
impl ApplicationStore for RestStore {
    async fn fetch_job(&self, job_id: &str) -> Result<Option<JobRow>, StoreError> {
        let request = self.client.get(self.table_url("jobs")).query(&[
            ("id", format!("eq.{job_id}")),
            ("select", "*".to_string()),
            ("limit", "1".to_string()),
        ]);
        let rows: Vec<JobRow> = self.fetch_rows(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn list_applications(&self, job_id: &str) -> Result<Vec<ApplicationRow>, StoreError> {
        let request = self.client.get(self.table_url("applications")).query(&[
            ("job_id", format!("eq.{job_id}")),
            ("select", APPLICATION_SELECT.to_string()),
        ]);
        self.fetch_rows(request).await
    }

    async fn find_application(
        &self,
        job_id: &str,
        candidate_id: &str,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        let request = self.client.get(self.table_url("applications")).query(&[
            ("job_id", format!("eq.{job_id}")),
            ("candidate_id", format!("eq.{candidate_id}")),
            ("select", "id".to_string()),
            ("limit", "1".to_string()),
        ]);
        let rows: Vec<ApplicationRecord> = self.fetch_rows(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn patch_application(&self, id: &str, patch: &ScorePatch) -> Result<(), StoreError> {
        let request = self
            .client
            .patch(self.table_url("applications"))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(patch);
        self.send(request).await?;
        Ok(())
    }

    async fn insert_application(
        &self,
        application: &NewApplication,
    ) -> Result<ApplicationRecord, StoreError> {
        let request = self
            .client
            .post(self.table_url("applications"))
            .header("Prefer", "return=representation")
            .json(application);
        let rows: Vec<ApplicationRecord> = self.fetch_rows(request).await?;
        rows.into_iter().next().ok_or(StoreError::MissingRow)
    }
}
