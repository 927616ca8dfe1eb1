//! Filesystem-backed workspace.
//!
//! The snapshot is a JSON manifest listing every file under the root with its
//! relative path and base64 content. Hidden entries and common build output
//! directories are skipped.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use refassist_core::workspace::Workspace;
use refassist_core::{RefAssistError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SKIPPED_DIRS: &[&str] = &["target", "node_modules", "build", "dist"];

/// Wire form of a workspace snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    pub root_name: String,
    pub files: Vec<SnapshotFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotFile {
    /// Path relative to the workspace root, always with `/` separators.
    pub path: String,
    pub size: u64,
    /// Base64-encoded file content.
    pub content: String,
}

impl SnapshotFile {
    pub fn decoded(&self) -> Result<Vec<u8>> {
        STANDARD.decode(&self.content).map_err(|e| RefAssistError::Serialization {
            format: "base64".to_string(),
            message: e.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryWorkspace {
    root: PathBuf,
    max_file_bytes: u64,
}

impl DirectoryWorkspace {
    /// Files larger than this are left out of the snapshot.
    pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_file_bytes: Self::DEFAULT_MAX_FILE_BYTES,
        }
    }

    pub fn with_max_file_bytes(mut self, max_file_bytes: u64) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Collects every eligible file under the root, sorted by path.
    pub async fn collect(&self) -> Result<WorkspaceSnapshot> {
        let mut files = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if is_skipped(&name) {
                    continue;
                }

                let file_type = entry.file_type().await?;
                let path = entry.path();
                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_file() {
                    let size = entry.metadata().await?.len();
                    if size > self.max_file_bytes {
                        tracing::debug!(
                            path = %path.display(),
                            size,
                            "[DirectoryWorkspace] Skipping large file"
                        );
                        continue;
                    }
                    let content = tokio::fs::read(&path).await?;
                    files.push(SnapshotFile {
                        path: relative_path(&self.root, &path),
                        size,
                        content: STANDARD.encode(content),
                    });
                }
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(WorkspaceSnapshot {
            root_name: self
                .root
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            files,
        })
    }
}

#[async_trait]
impl Workspace for DirectoryWorkspace {
    async fn is_empty(&self) -> bool {
        let Ok(mut entries) = tokio::fs::read_dir(&self.root).await else {
            return true;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            if !is_skipped(&entry.file_name().to_string_lossy()) {
                return false;
            }
        }
        true
    }

    async fn snapshot(&self) -> Result<Vec<u8>> {
        let snapshot = self.collect().await?;
        tracing::info!(
            root = %self.root.display(),
            files = snapshot.files.len(),
            "[DirectoryWorkspace] Snapshot collected"
        );
        Ok(serde_json::to_vec(&snapshot)?)
    }
}

fn is_skipped(name: &str) -> bool {
    name.starts_with('.') || SKIPPED_DIRS.contains(&name)
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
