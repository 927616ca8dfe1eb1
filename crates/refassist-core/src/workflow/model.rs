//! Engagement, assessment and interaction shapes.

use super::status::WorkflowStatus;
use serde::{Deserialize, Serialize};

/// A server-side conversation context.
///
/// Assigned by the remote on first contact and kept for the lifetime of the
/// conversation, unless a hard error forces a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
    pub engagement_id: String,
}

/// Result of starting an assessment job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedAssessment {
    pub assessment_id: String,
    pub status: WorkflowStatus,
}

/// One observation of an assessment job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentStatus {
    pub status: WorkflowStatus,
    /// Free-text progress message shown to the user while the job runs.
    #[serde(default)]
    pub status_detail: String,
}

/// Result of starting a follow-up interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedInteraction {
    pub interaction_id: String,
    pub status: WorkflowStatus,
}

/// One observation of a follow-up interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionStatus {
    pub status: WorkflowStatus,
    /// Answer text; only meaningful once the interaction has completed.
    #[serde(default)]
    pub response_text: String,
}

impl AssessmentStatus {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl InteractionStatus {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
