use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::gemini_client::{DEFAULT_API_BASE, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed numeric values are errors.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub gemini_api_base: String,
    pub gemini_model: String,
    pub gemini_timeout: Duration,
    /// Directory path or `http(s)://` base URL of the reference images.
    pub assets_base: String,
    pub credentials_path: PathBuf,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let timeout_secs = env_or("GEMINI_TIMEOUT_SECS", "180")
            .parse::<u64>()
            .context("GEMINI_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Config {
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            gemini_api_base: env_or("GEMINI_API_BASE", DEFAULT_API_BASE),
            gemini_model: env_or("GEMINI_MODEL", DEFAULT_MODEL),
            gemini_timeout: Duration::from_secs(timeout_secs),
            assets_base: env_or("ASSETS_BASE", "public/characters"),
            credentials_path: PathBuf::from(env_or("CREDENTIALS_PATH", ".manga/credentials.json")),
            output_dir: PathBuf::from(env_or("OUTPUT_DIR", "output")),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
