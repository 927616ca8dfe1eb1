//! Configuration model.
//!
//! The file format is TOML (`~/.config/refassist/config.toml`); loading lives
//! in `refassist-infrastructure`. Every section has defaults so an absent or
//! partial file is valid.

use crate::error::{RefAssistError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3030";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_MAX_CONSECUTIVE_ERRORS: u32 = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_ENDPOINT: &str = "REFASSIST_ENDPOINT";
pub const ENV_IDENTITY_TOKEN: &str = "REFASSIST_IDENTITY_TOKEN";
pub const ENV_POLL_INTERVAL_MS: &str = "REFASSIST_POLL_INTERVAL_MS";
pub const ENV_MAX_POLL_ERRORS: &str = "REFASSIST_MAX_POLL_ERRORS";
pub const ENV_ARTIFACT_DIR: &str = "REFASSIST_ARTIFACT_DIR";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub remote: RemoteConfig,
    pub polling: PollingConfig,
    pub artifacts: ArtifactConfig,
}

/// Remote job API connection settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub request_timeout_secs: u64,
    /// Opaque bearer token forwarded with every request.
    pub identity_token: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            identity_token: None,
        }
    }
}

impl RemoteConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Poll loop settings. Fixed delay, flat consecutive-error cutoff.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_ms: u64,
    pub max_consecutive_errors: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_consecutive_errors: DEFAULT_MAX_CONSECUTIVE_ERRORS,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Where downloaded plans are written. Falls back to the data directory.
    pub directory: Option<PathBuf>,
}

impl AppConfig {
    /// Parses a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `REFASSIST_*` overrides using the given variable lookup.
    ///
    /// The lookup is injected so overrides can be tested without touching the
    /// process environment.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.remote.endpoint = endpoint;
        }
        if let Some(token) = lookup(ENV_IDENTITY_TOKEN) {
            self.remote.identity_token = Some(token);
        }
        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            self.polling.interval_ms = parse_number(ENV_POLL_INTERVAL_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_POLL_ERRORS) {
            self.polling.max_consecutive_errors = parse_number(ENV_MAX_POLL_ERRORS, &raw)?;
        }
        if let Some(dir) = lookup(ENV_ARTIFACT_DIR) {
            self.artifacts.directory = Some(PathBuf::from(dir));
        }
        self.validate()?;
        Ok(self)
    }

    /// Rejects settings the poll loop cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.remote.endpoint.trim().is_empty() {
            return Err(RefAssistError::config("remote.endpoint must not be empty"));
        }
        if self.polling.max_consecutive_errors == 0 {
            return Err(RefAssistError::config(
                "polling.max_consecutive_errors must be at least 1",
            ));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| RefAssistError::config(format!("{name} must be a number, got '{raw}'")))
}
