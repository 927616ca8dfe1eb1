//! Error types for the Refactor Assistant.

use thiserror::Error;

/// A shared error type for the entire Refactor Assistant.
///
/// Variants are typed so that callers can route on the failure kind
/// (remote failure vs. contract violation) without inspecting message text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefAssistError {
    /// A request to the remote job API failed (transport, non-2xx, malformed body).
    #[error("Remote call to '{endpoint}' failed: {cause}")]
    RemoteCall { endpoint: String, cause: String },

    /// Polling gave up after too many consecutive fetch failures.
    #[error("Polling gave up after {attempts} consecutive failures: {last_error}")]
    PollExhausted { attempts: u32, last_error: String },

    /// An interaction was attempted on a state with no legal transition.
    #[error("Illegal state transition: {0}")]
    IllegalState(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RefAssistError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a RemoteCall error
    pub fn remote_call(endpoint: impl Into<String>, cause: impl ToString) -> Self {
        Self::RemoteCall {
            endpoint: endpoint.into(),
            cause: cause.to_string(),
        }
    }

    /// Creates a PollExhausted error
    pub fn poll_exhausted(attempts: u32, last_error: impl ToString) -> Self {
        Self::PollExhausted {
            attempts,
            last_error: last_error.to_string(),
        }
    }

    /// Creates an IllegalState error
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a RemoteCall error
    pub fn is_remote_call(&self) -> bool {
        matches!(self, Self::RemoteCall { .. })
    }

    /// Check if this is a PollExhausted error
    pub fn is_poll_exhausted(&self) -> bool {
        matches!(self, Self::PollExhausted { .. })
    }

    /// Check if this is an IllegalState error
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, Self::IllegalState(_))
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Whether this failure came from talking to the remote job API.
    ///
    /// Remote failures are recovered by routing the conversation to
    /// `ConversationErrored`; everything else is a local fault.
    pub fn is_remote(&self) -> bool {
        self.is_remote_call() || self.is_poll_exhausted()
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for RefAssistError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for RefAssistError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for RefAssistError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, RefAssistError>`.
pub type Result<T> = std::result::Result<T, RefAssistError>;
