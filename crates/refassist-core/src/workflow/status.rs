use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a remote job (assessment or interaction).
///
/// Once a job reaches a terminal status the remote side never changes it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl WorkflowStatus {
    /// Every status at which polling stops.
    pub const TERMINAL: [WorkflowStatus; 3] = [Self::Completed, Self::Failed, Self::Cancelled];

    /// Returns true for `COMPLETED`, `FAILED` and `CANCELLED`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }

    /// Wire representation of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
