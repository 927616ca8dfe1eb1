//! Authentication signal consumed by the controller.
//!
//! Identity management itself lives outside this crate; the conversation only
//! needs to know whether the user is connected and, if not, which prompt to show.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Connection state reported by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialState {
    Connected,
    Disconnected,
    Expired,
    Unsupported,
}

impl CredentialState {
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// The auth flow and message to show for this state.
    pub fn auth_prompt(self) -> (AuthFollowUpType, &'static str) {
        match self {
            Self::Expired => (
                AuthFollowUpType::ReAuth,
                "Your connection has expired. Re-authenticate to continue.",
            ),
            Self::Unsupported => (
                AuthFollowUpType::UseSupportedAuth,
                "Your current connection does not support the Refactor Assistant. Switch to a supported connection to continue.",
            ),
            Self::Connected | Self::Disconnected => (
                AuthFollowUpType::FullAuth,
                "You need to authenticate before using the Refactor Assistant.",
            ),
        }
    }
}

/// Which authentication flow the UI should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthFollowUpType {
    FullAuth,
    ReAuth,
    UseSupportedAuth,
}

/// Source of the "is authenticated" signal and the opaque identity token.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn credential_state(&self) -> CredentialState;

    /// Opaque bearer token forwarded to the remote job API, if any.
    async fn identity_token(&self) -> Option<String> {
        None
    }
}

/// An auth provider with a fixed answer; used when identity is configured
/// statically (for example through `REFASSIST_IDENTITY_TOKEN`).
#[derive(Debug, Clone)]
pub struct StaticAuthProvider {
    state: CredentialState,
    token: Option<String>,
}

impl StaticAuthProvider {
    pub fn new(state: CredentialState, token: Option<String>) -> Self {
        Self { state, token }
    }

    pub fn connected(token: Option<String>) -> Self {
        Self::new(CredentialState::Connected, token)
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn credential_state(&self) -> CredentialState {
        self.state
    }

    async fn identity_token(&self) -> Option<String> {
        self.token.clone()
    }
}
