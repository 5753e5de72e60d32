use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_MODEL;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_COLLABORATOR_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Service configuration loaded from environment variables.
/// Every variable has a default; without `GEMINI_API_KEY` the deterministic
/// collaborators are used.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// JSON file overriding the built-in scoring configuration.
    pub scoring_config: Option<PathBuf>,
    /// Time box around each skill extraction / explanation call.
    pub collaborator_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            rust_log: "info".to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            scoring_config: None,
            collaborator_timeout: Duration::from_secs(DEFAULT_COLLABORATOR_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            port: parse_or(&non_empty, "PORT", DEFAULT_PORT)?,
            rust_log: non_empty("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            gemini_model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            scoring_config: non_empty("SCORING_CONFIG").map(PathBuf::from),
            collaborator_timeout: Duration::from_secs(parse_or(
                &non_empty,
                "COLLABORATOR_TIMEOUT_SECS",
                DEFAULT_COLLABORATOR_TIMEOUT_SECS,
            )?),
            max_upload_bytes: parse_or(&non_empty, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
