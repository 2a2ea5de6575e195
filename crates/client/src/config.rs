//! Client configuration, resolved once at start-up.

use std::time::Duration;

use skinfit_observability::{LogFormat, ParseLogFormatError};
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub const API_URL_VAR: &str = "SKINFIT_API_URL";
pub const TIMEOUT_VAR: &str = "SKINFIT_HTTP_TIMEOUT_SECS";
pub const LOG_FORMAT_VAR: &str = "SKINFIT_LOG_FORMAT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash.
    pub api_url: String,
    pub timeout: Duration,
    pub log_format: LogFormat,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SKINFIT_API_URL is not a valid http(s) URL: {0}")]
    InvalidApiUrl(String),

    #[error("SKINFIT_HTTP_TIMEOUT_SECS must be a positive number of seconds, got `{0}`")]
    InvalidTimeout(String),

    #[error("SKINFIT_LOG_FORMAT: {0}")]
    InvalidLogFormat(#[from] ParseLogFormatError),
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ClientConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Unset or blank keys
    /// take their defaults; set keys must be valid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(API_URL_VAR) {
            config.api_url = normalize_api_url(&url)?;
        }

        if let Some(raw) = get(TIMEOUT_VAR) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            if secs == 0 {
                return Err(ConfigError::InvalidTimeout(raw));
            }
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = get(LOG_FORMAT_VAR) {
            config.log_format = raw.parse()?;
        }

        Ok(config)
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed =
        reqwest::Url::parse(trimmed).map_err(|e| ConfigError::InvalidApiUrl(format!("{trimmed}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidApiUrl(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}
