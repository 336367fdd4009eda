use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// The persistence store and the attrition model are both optional.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub store: Option<StoreConfig>,
    pub attrition_model_path: Option<PathBuf>,
    pub rank_concurrency: usize,
}

/// Connection settings for the PostgREST-compatible application store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub service_key: String,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let timeout_secs = parse_env("STORE_TIMEOUT_SECS", 10_u64)?;
        let store = match (optional_env("SUPABASE_URL"), optional_env("SUPABASE_SERVICE_ROLE_KEY")) {
            (Some(base_url), Some(service_key)) => Some(StoreConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                service_key,
                timeout_secs,
            }),
            _ => None,
        };

        let rank_concurrency = parse_env("RANK_CONCURRENCY", 8_usize)?;
        if rank_concurrency == 0 {
            anyhow::bail!("RANK_CONCURRENCY must be at least 1");
        }

        Ok(Config {
            port: parse_env("PORT", 5500_u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            store,
            attrition_model_path: optional_env("ATTRITION_MODEL_PATH").map(PathBuf::from),
            rank_concurrency,
        })
    }
}

/// Returns the variable's value, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
