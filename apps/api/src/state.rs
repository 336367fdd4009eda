use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::scoring::attrition::{AttritionPredictor, LogisticAttritionModel};
use crate::store::{ApplicationStore, RestStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Absent when no store is configured: scoring still works, ranking fails.
    pub store: Option<Arc<dyn ApplicationStore>>,
    /// Absent when no model is configured: attrition risk defaults to 0.0.
    pub predictor: Option<Arc<dyn AttritionPredictor>>,
    /// Upper bound on rows scored and persisted concurrently during a rank.
    pub rank_concurrency: usize,
}

impl AppState {
    /// Builds the store adapter and loads the attrition model, once, at startup.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store: Option<Arc<dyn ApplicationStore>> = match &config.store {
            Some(store_config) => {
                let store = RestStore::new(store_config).context("failed to build store client")?;
                info!("Application store configured at {}", store_config.base_url);
                Some(Arc::new(store))
            }
            None => {
                info!("No application store configured; scores will not be persisted");
                None
            }
        };

        let predictor: Option<Arc<dyn AttritionPredictor>> = match &config.attrition_model_path {
            Some(path) => {
                let model = LogisticAttritionModel::load(path).with_context(|| {
                    format!("failed to load attrition model from {}", path.display())
                })?;
                info!("Attrition model loaded from {}", path.display());
                Some(Arc::new(model))
            }
            None => {
                info!("No attrition model configured; attrition risk defaults to 0");
                None
            }
        };

        Ok(Self {
            store,
            predictor,
            rank_concurrency: config.rank_concurrency,
        })
    }
}
