use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_API_BASE, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Everything is optional: a missing API key switches generation to fallbacks,
/// a missing `DATABASE_URL` selects the in-memory store.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_api_base: String,
    pub openai_model_name: String,
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_api_base: optional_env("OPENAI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            openai_model_name: optional_env("OPENAI_MODEL_NAME")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            database_url: optional_env("DATABASE_URL"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Unset and blank variables both read as `None`.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
