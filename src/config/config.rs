use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::{
    CONFIG_FILE, DEFAULT_ANALYTICS_DAYS, DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS,
    ENV_ACCESS_TOKEN, ENV_API_URL, ENV_IDENTITY_ANON_KEY, ENV_IDENTITY_URL,
};
use crate::error::{CivicError, CivicResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub identity_url: Option<String>,
    #[serde(default)]
    pub identity_anon_key: Option<String>,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_analytics_days")]
    pub analytics_days: u32,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_analytics_days() -> u32 {
    DEFAULT_ANALYTICS_DAYS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: default_api_url(),
            access_token: None,
            identity_url: None,
            identity_anon_key: None,
            request_timeout_secs: default_timeout(),
            analytics_days: default_analytics_days(),
        }
    }
}

impl Config {
    /// Credentials for the identity service, if both halves are configured.
    pub fn identity_credentials(&self) -> Option<(&str, &str)> {
        match (self.identity_url.as_deref(), self.identity_anon_key.as_deref()) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => Some((url, key)),
            _ => None,
        }
    }

    /// A zero timeout would fail every request, so it falls back to the default.
    fn with_usable_timeout(mut self) -> Self {
        if self.request_timeout_secs == 0 {
            warn!(
                "request_timeout_secs is 0, using {}s",
                DEFAULT_REQUEST_TIMEOUT_SECS
            );
            self.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }
        self
    }

    /// Environment variables take precedence over the file.
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var(ENV_API_URL) {
            self.api_url = url;
        }
        if let Ok(token) = env::var(ENV_ACCESS_TOKEN) {
            self.access_token = Some(token);
        }
        if let Ok(url) = env::var(ENV_IDENTITY_URL) {
            self.identity_url = Some(url);
        }
        if let Ok(key) = env::var(ENV_IDENTITY_ANON_KEY) {
            self.identity_anon_key = Some(key);
        }
        self
    }
}

pub fn config_path() -> CivicResult<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| CivicError::Configuration("Could not find home directory".to_string()))?;
    Ok(home_dir.join(CONFIG_FILE))
}

pub fn load_config() -> CivicResult<Config> {
    let config = load_config_from(&config_path()?)?;
    Ok(config.apply_env_overrides())
}

pub fn load_config_from(path: &Path) -> CivicResult<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let config_str = fs::read_to_string(path).map_err(|e| {
        CivicError::Configuration(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let config: Config = serde_json::from_str(&config_str).map_err(|e| {
        CivicError::Configuration(format!("Malformed config {}: {}", path.display(), e))
    })?;
    Ok(config.with_usable_timeout())
}

pub fn save_config_to(config: &Config, path: &Path) -> CivicResult<()> {
    let config_str = serde_json::to_string_pretty(config)?;
    fs::write(path, config_str)?;
    Ok(())
}
