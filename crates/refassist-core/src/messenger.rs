//! Outbound event sink.

use crate::auth::AuthFollowUpType;
use crate::event::{FollowUp, UiEvent};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Fire-and-forget sink for `UiEvent`s.
///
/// Implementations must not block; a dropped or slow consumer is never the
/// conversation's problem.
pub trait Messenger: Send + Sync {
    fn publish(&self, event: UiEvent);
}

/// A messenger that forwards every event into a tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelMessenger {
    sender: mpsc::UnboundedSender<UiEvent>,
}

impl ChannelMessenger {
    /// Create a new messenger with the given channel sender
    pub fn new(sender: mpsc::UnboundedSender<UiEvent>) -> Self {
        Self { sender }
    }

    /// Creates a messenger together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl Messenger for ChannelMessenger {
    fn publish(&self, event: UiEvent) {
        // Non-blocking send - if the receiver is dropped, we just skip
        let _ = self.sender.send(event);
    }
}

/// A `Messenger` bound to a single session, with one helper per event shape.
#[derive(Clone)]
pub struct SessionMessenger {
    session_id: String,
    inner: Arc<dyn Messenger>,
}

impl SessionMessenger {
    pub fn new(session_id: impl Into<String>, inner: Arc<dyn Messenger>) -> Self {
        Self {
            session_id: session_id.into(),
            inner,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn send_answer(&self, message: impl Into<String>) {
        self.publish_answer(message.into(), None, false);
    }

    pub fn send_answer_with_follow_up(&self, message: impl Into<String>, follow_up: FollowUp) {
        self.publish_answer(message.into(), Some(follow_up), false);
    }

    /// An answer the user may rate (generated plan text, Q&A responses).
    pub fn send_votable_answer(&self, message: impl Into<String>) {
        self.publish_answer(message.into(), None, true);
    }

    /// Opens a streaming message; later `update_answer` calls replace its text.
    pub fn send_initial_stream(&self, message_id: &str, message: impl Into<String>) {
        self.update_answer(message_id, message);
    }

    pub fn update_answer(&self, message_id: &str, message: impl Into<String>) {
        self.inner.publish(UiEvent::AnswerStream {
            session_id: self.session_id.clone(),
            message_id: message_id.to_string(),
            message: message.into(),
        });
    }

    pub fn update_placeholder(&self, placeholder: impl Into<String>) {
        self.inner.publish(UiEvent::PlaceholderUpdate {
            session_id: self.session_id.clone(),
            placeholder: placeholder.into(),
        });
    }

    pub fn clear_placeholder(&self) {
        self.update_placeholder("");
    }

    pub fn send_auth_needed(&self, auth_type: AuthFollowUpType, message: impl Into<String>) {
        self.inner.publish(UiEvent::AuthNeeded {
            session_id: self.session_id.clone(),
            auth_type,
            message: message.into(),
        });
    }

    pub fn send_input_enabled(&self, enabled: bool) {
        self.inner.publish(UiEvent::InputEnabled {
            session_id: self.session_id.clone(),
            enabled,
        });
    }

    fn publish_answer(&self, message: String, follow_up: Option<FollowUp>, can_be_voted: bool) {
        self.inner.publish(UiEvent::Answer {
            session_id: self.session_id.clone(),
            message,
            follow_up,
            can_be_voted,
        });
    }
}
