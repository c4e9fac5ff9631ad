use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::types::Credentials;

/// Application configuration loaded from environment variables.
/// Secrets are required; behavior knobs (portal URL, listing label, skip
/// count, output locations) have defaults matching the reference setup so
/// a plain `.env` with credentials is enough to run.
#[derive(Debug, Clone)]
pub struct Config {
    // Portal login
    pub credentials: Credentials,

    // AI / LLM
    pub open_router_api_key: String,
    pub model: String,

    // Portal navigation
    pub base_url: String,
    pub listing_label: String,
    pub skip_count: usize,

    // Browser
    pub profile_dir: PathBuf,
    pub headless: bool,

    // Artifacts
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            credentials: Credentials {
                username: required("USERNAME")?,
                password: required("PASSWORD")?,
            },
            open_router_api_key: required("OPEN_ROUTER_API_KEY")?,
            model: env_or("OPEN_ROUTER_MODEL", "google/gemini-2.0-flash-exp:free"),
            base_url: env_or("SCOPE_URL", "https://scope.sciencecoop.ubc.ca"),
            listing_label: env_or("SCOPE_LISTING_LABEL", "F25 - Early Sept 2025 Postings"),
            skip_count: env_or("SCOPE_SKIP_COUNT", "16")
                .parse()
                .map_err(|_| anyhow!("SCOPE_SKIP_COUNT must be a number"))?,
            profile_dir: PathBuf::from(env_or("SCOPE_PROFILE_DIR", "./my_scope_profile")),
            headless: env_or("SCOPE_HEADLESS", "false")
                .parse()
                .unwrap_or(false),
            output_dir: PathBuf::from(env_or("SCOPE_OUTPUT_DIR", ".")),
        };

        Ok(config)
    }

    /// Log the loaded configuration with secrets reduced to a preview.
    pub fn log_redacted(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  USERNAME: {}", self.credentials.username);
        tracing::info!("  PASSWORD: {}", preview(&self.credentials.password));
        tracing::info!("  OPEN_ROUTER_API_KEY: {}", preview(&self.open_router_api_key));
        tracing::info!("  OPEN_ROUTER_MODEL: {}", self.model);
        tracing::info!("  SCOPE_URL: {}", self.base_url);
        tracing::info!("  SCOPE_LISTING_LABEL: {}", self.listing_label);
        tracing::info!("  SCOPE_SKIP_COUNT: {}", self.skip_count);
        tracing::info!("  SCOPE_PROFILE_DIR: {}", self.profile_dir.display());
        tracing::info!("  SCOPE_OUTPUT_DIR: {}", self.output_dir.display());
    }
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| anyhow!("{key} environment variable is required"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// First few characters of a secret plus its length. Counted in chars so a
/// secret starting with multibyte text never splits a character.
fn preview(val: &str) -> String {
    let head: String = val.chars().take(3).collect();
    format!("{}...({} chars)", head, val.chars().count())
}
