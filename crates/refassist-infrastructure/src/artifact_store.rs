use async_trait::async_trait;
use refassist_core::Result;
use refassist_core::workspace::{ArtifactLocator, ArtifactRequest, ArtifactStore};
use std::path::{Path, PathBuf};

/// Writes plan artifacts as markdown files into one directory.
///
/// Each file is named after its assessment, so a revision never overwrites
/// an earlier plan.
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    directory: PathBuf,
}

impl FileArtifactStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, request: &ArtifactRequest) -> PathBuf {
        // Assessment ids come from the server; keep them from escaping the directory.
        let file_name: String = request
            .file_name()
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        self.directory.join(file_name)
    }
}

#[async_trait]
impl ArtifactStore for FileArtifactStore {
    async fn store_artifact(&self, request: ArtifactRequest) -> Result<ArtifactLocator> {
        tokio::fs::create_dir_all(&self.directory).await?;

        let path = self.path_for(&request);
        tokio::fs::write(&path, request.content.as_bytes()).await?;

        tracing::info!(
            session_id = %request.session_id,
            assessment_id = %request.assessment_id,
            path = %path.display(),
            "[FileArtifactStore] Artifact stored"
        );
        Ok(ArtifactLocator(path.display().to_string()))
    }

    async fn export_artifact(&self, content: &str, destination: &Path) -> Result<ArtifactLocator> {
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(destination, content.as_bytes()).await?;

        tracing::info!(
            path = %destination.display(),
            bytes = content.len(),
            "[FileArtifactStore] Artifact exported"
        );
        Ok(ArtifactLocator(destination.display().to_string()))
    }
}
