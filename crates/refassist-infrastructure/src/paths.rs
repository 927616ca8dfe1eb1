//! Path management for refassist configuration and artifacts.
//!
//! ```text
//! ~/.config/refassist/          # Config directory
//! └── config.toml               # Application configuration
//!
//! ~/.local/share/refassist/     # Data directory
//! └── artifacts/                # Downloaded plans (RA_PLAN_<assessment>.md)
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "refassist";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for refassist_core::RefAssistError {
    fn from(err: PathError) -> Self {
        refassist_core::RefAssistError::config(err.to_string())
    }
}

pub struct RefAssistPaths;

impl RefAssistPaths {
    /// Returns the refassist configuration directory (e.g. `~/.config/refassist/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the refassist data directory (e.g. `~/.local/share/refassist/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Default directory for stored plan artifacts.
    pub fn artifact_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("artifacts"))
    }
}
