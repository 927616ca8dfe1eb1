//! Remote workflow domain module.
//!
//! Types describing the server-side engagement and the jobs that run inside
//! it. These mirror what the remote job API reports; the local side never
//! mutates them except by observing a newer poll response.
//!
//! # Module Structure
//!
//! - `status`: Job status vocabulary (`WorkflowStatus`)
//! - `model`: Request/response shapes for engagements, assessments, interactions
//! - `intent`: Follow-up intent classification (`UserIntent`)

mod intent;
mod model;
mod status;

pub use intent::UserIntent;
pub use model::{
    AssessmentStatus, Engagement, InteractionStatus, StartedAssessment, StartedInteraction,
};
pub use status::WorkflowStatus;
