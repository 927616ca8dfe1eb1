//! Filesystem-backed collaborators for the Refactor Assistant.
//!
//! - [`ConfigService`]: config file loading with environment overrides
//! - [`FileArtifactStore`]: plan artifacts written as markdown files
//! - [`DirectoryWorkspace`]: a directory tree packaged as an uploadable snapshot

pub mod artifact_store;
pub mod config_service;
pub mod directory_workspace;
pub mod paths;

pub use artifact_store::FileArtifactStore;
pub use config_service::ConfigService;
pub use directory_workspace::{DirectoryWorkspace, SnapshotFile, WorkspaceSnapshot};
pub use paths::{PathError, RefAssistPaths};
