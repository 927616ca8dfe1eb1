//! Workspace and artifact collaborators.
//!
//! File enumeration, packaging and artifact display are handled outside the
//! conversation; these traits are the narrow seams it calls through.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// The user's open workspace.
#[async_trait]
pub trait Workspace: Send + Sync {
    /// True when there is nothing to assess.
    async fn is_empty(&self) -> bool;

    /// Packages the workspace into an uploadable snapshot.
    async fn snapshot(&self) -> Result<Vec<u8>>;
}

/// A downloaded assessment artifact waiting to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRequest {
    pub session_id: String,
    pub assessment_id: String,
    pub content: String,
}

impl ArtifactRequest {
    /// File name for the artifact. The assessment id keeps revisions apart.
    pub fn file_name(&self) -> String {
        plan_file_name(&self.assessment_id)
    }
}

/// Default file name of the plan produced by `assessment_id`.
pub fn plan_file_name(assessment_id: &str) -> String {
    format!("RA_PLAN_{}.md", assessment_id)
}

/// Where a stored artifact can be found (a path, URI or virtual document id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactLocator(pub String);

impl fmt::Display for ArtifactLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persists downloaded artifacts so the summary message can link to them.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn store_artifact(&self, request: ArtifactRequest) -> Result<ArtifactLocator>;

    /// Writes `content` to a destination the user chose.
    async fn export_artifact(&self, content: &str, destination: &Path) -> Result<ArtifactLocator>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_file_name_carries_assessment_id() {
        let request = ArtifactRequest {
            session_id: "tab-1".to_string(),
            assessment_id: "A1".to_string(),
            content: "# Plan".to_string(),
        };
        assert_eq!(request.file_name(), "RA_PLAN_A1.md");
    }
}
