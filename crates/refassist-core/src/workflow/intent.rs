use serde::{Deserialize, Serialize};

/// Classification of a follow-up utterance, decided by the remote side.
///
/// Unknown values from the server collapse into `Default`, which the
/// conversation treats as "didn't understand".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserIntent {
    /// A question about the current plan.
    QuestionAndAnswer,
    /// A request to revise the current plan.
    Assessment,
    /// A request to start over with a brand new analysis.
    NewAssessment,
    #[serde(other)]
    Default,
}
