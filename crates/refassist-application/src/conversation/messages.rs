//! User-facing text and follow-up suggestions.
//!
//! Raw error text never ends up here; failures are described generically and
//! the details go to the log.

use refassist_core::event::{FollowUp, FollowUpOption};
use refassist_core::workspace::ArtifactLocator;

pub const CLARIFYING_PROMPT: &str =
    "No problem! Before I start, is there any other requirements you would want me to consider while generating your refactoring requirements?";
pub const REVISION_PROMPT: &str =
    "No problem! Before I start, are there any aspects of the plan you would like me to focus on for the next revision?";

pub const CREATING_PLAN: &str = "Ok, let me create a plan. This may take a few minutes";
pub const REVISING_PLAN: &str = "Ok, let me revise the plan. This may take a few minutes";
pub const UPLOADING_WORKSPACE: &str = "Uploading workspace...";
pub const STARTING_REVISION: &str = "Starting plan revision...";
pub const GENERATING_PLAN_PLACEHOLDER: &str = "Generating implementation plan ...";
pub const CANCELLING_PLAN: &str = "Cancelling plan generation";

pub const PLAN_FAILED: &str = "Plan generation failed.";
pub const PLAN_CANCELLED: &str = "Plan generation was cancelled.";

pub const GENERATING_RESPONSE: &str = "Generating response...";
pub const GENERATING_RESPONSE_PLACEHOLDER: &str = "Generating response ...";
pub const RESPONSE_FAILED: &str =
    "I wasn't able to answer that question. Please try asking it another way.";
pub const RESPONSE_CANCELLED: &str = "Response generation was cancelled.";

pub const GENERIC_APOLOGY: &str = "Sorry, something went wrong. Please try again.";
pub const EMPTY_WORKSPACE: &str =
    "I'm sorry, I can't create a plan for an empty workspace. Please open a workspace you would like to create a refactor assessment for.";

pub const HELP: &str =
    "Try asking questions related to refactoring a monolithic codebase to microservices, generating starter code for microservices or help with deploying microservice starter code.";
pub const REAUTHENTICATE: &str = "Follow instructions to re-authenticate";

pub const NO_PLAN_TO_DOWNLOAD: &str =
    "There is no plan to download yet. Describe what you want to refactor and I'll create one.";
pub const DOWNLOAD_FAILED: &str = "Sorry, I couldn't download the plan. Please try again.";

const FOLLOW_UP_HINT: &str =
    "You can ask me any follow up questions you may have or adjust any part by generating a revised analysis.";

pub fn plan_ready(locator: &ArtifactLocator) -> String {
    format!(
        "Your Refactor Assistant analysis is ready! A local markdown version is available [here]({}).\n\n{}",
        locator, FOLLOW_UP_HINT
    )
}

pub fn plan_downloaded(locator: &ArtifactLocator) -> String {
    format!("The plan was saved to {}", locator)
}

pub fn another_follow_up() -> String {
    format!("Would you like to ask another follow up?\n\n{}", FOLLOW_UP_HINT)
}

pub fn did_not_understand() -> String {
    format!("I'm sorry, I don't understand your response.\n\n{}", FOLLOW_UP_HINT)
}

pub fn help_follow_ups() -> FollowUp {
    FollowUp::examples(vec![FollowUpOption::echo("Run analysis")])
}

/// Suggestions shown with the clarifying prompt.
pub fn clarifying_follow_ups() -> FollowUp {
    FollowUp::examples(vec![
        FollowUpOption::echo("Describe the core functionalities of the monolithic application"),
        FollowUpOption::echo("No, let's start"),
    ])
}

/// Suggestions shown with the revision prompt.
pub fn revision_follow_ups() -> FollowUp {
    FollowUp::examples(vec![
        FollowUpOption::echo("Optimize for costs"),
        FollowUpOption::echo("Break apart responsibilities into more distinct domains"),
    ])
}

/// Suggestions shown once a plan exists.
pub fn plan_follow_ups() -> FollowUp {
    FollowUp::examples(vec![
        FollowUpOption::new("Explain Output Validation Metrics", "explain analysis"),
        FollowUpOption::new("Explain recommended microservices", "explain analysis"),
        FollowUpOption::new("Generate a revised analysis", "revise analysis"),
    ])
}
