use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_LOCATION: &str = "us-central1";

/// Application configuration loaded from environment variables.
/// Vertex AI settings are optional: without them the service still starts
/// and generation calls report that the model is not configured.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub project_id: Option<String>,
    pub location: String,
    pub access_token: Option<String>,
    pub prompts_dir: PathBuf,
    pub outputs_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            project_id: optional_env("GOOGLE_CLOUD_PROJECT_ID"),
            location: optional_env("GOOGLE_CLOUD_LOCATION")
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            access_token: optional_env("GOOGLE_CLOUD_ACCESS_TOKEN"),
            prompts_dir: optional_env("PROMPTS_DIR")
                .unwrap_or_else(|| "prompts".to_string())
                .into(),
            outputs_dir: optional_env("OUTPUTS_DIR")
                .unwrap_or_else(|| "outputs".to_string())
                .into(),
        })
    }
}

/// Reads `key`, treating an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
