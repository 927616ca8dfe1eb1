//! Remote job API access for the Refactor Assistant.
//!
//! - [`RemoteWorkflowClient`]: the operations the conversation performs
//! - [`HttpWorkflowClient`]: JSON-over-HTTP implementation
//! - [`poll_until_terminal`]: fixed-delay poll loop with bounded error tolerance

pub mod client;
pub mod http;
pub mod poll;

pub use client::RemoteWorkflowClient;
pub use http::{ClientMetadata, HttpWorkflowClient};
pub use poll::{PollOutcome, PollPolicy, poll_assessment, poll_interaction, poll_until_terminal};
