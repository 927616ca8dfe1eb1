//! Configuration loading.
//!
//! Reads `AppConfig` from `~/.config/refassist/config.toml` (or an explicit
//! path) and applies `REFASSIST_*` environment overrides on top.

use crate::paths::RefAssistPaths;
use refassist_core::config::AppConfig;
use refassist_core::{RefAssistError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Uses the default config file location.
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: RefAssistPaths::config_file()?,
        })
    }

    /// Uses an explicit config file, e.g. from `--config`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file and applies overrides from the process environment.
    pub async fn load(&self) -> Result<AppConfig> {
        self.load_with_env(|key| std::env::var(key).ok()).await
    }

    /// Loads the file and applies overrides from `lookup`.
    ///
    /// A missing file yields defaults; an unreadable or invalid one is an error.
    pub async fn load_with_env<F>(&self, lookup: F) -> Result<AppConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => AppConfig::from_toml(&content).map_err(|e| {
                RefAssistError::config(format!("{}: {}", self.path.display(), e))
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(
                    path = %self.path.display(),
                    "[ConfigService] No config file, using defaults"
                );
                AppConfig::default()
            }
            Err(err) => return Err(err.into()),
        };

        config.with_env_overrides(lookup)
    }
}
