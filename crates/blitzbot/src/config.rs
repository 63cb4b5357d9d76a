//! Bot process configuration.
//!
//! Loaded from a TOML file; the Wargaming credentials fall back to the
//! `APPLICATION_ID` / `ACCESS_TOKEN` environment variables so deployments
//! can keep secrets out of the file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

fn default_api_base() -> String {
    "https://api.wotblitz.com".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_record_db() -> PathBuf {
    PathBuf::from("blitzbot.db")
}

/// Runtime configuration for the bot process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Wargaming application id, sent with every API request.
    #[serde(default)]
    pub application_id: String,

    /// OAuth access token for private account data. Empty requests public
    /// data only, which is all the win-rate commands need.
    #[serde(default)]
    pub access_token: String,

    /// Base URL of the Wargaming mobile API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Response language passed to the API.
    #[serde(default = "default_language")]
    pub language: String,

    /// SQLite file backing the per-user record store.
    #[serde(default = "default_record_db")]
    pub record_db: PathBuf,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            application_id: String::new(),
            access_token: String::new(),
            api_base: default_api_base(),
            language: default_language(),
            record_db: default_record_db(),
        }
    }
}

impl BotConfig {
    /// Read configuration from a TOML file, then overlay credentials from
    /// the environment.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed reading config at {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("failed parsing config at {}", path.display()))?;
        Ok(config.overlay_env())
    }

    /// Configuration from defaults and the environment alone.
    pub fn from_env() -> Self {
        Self::default().overlay_env()
    }

    fn overlay_env(mut self) -> Self {
        if let Ok(id) = std::env::var("APPLICATION_ID") {
            self.application_id = id;
        }
        if let Ok(token) = std::env::var("ACCESS_TOKEN") {
            self.access_token = token;
        }
        self
    }
}
