//! Narrow interface to the remote generation service.
//!
//! The dispatcher only depends on these traits; `gemini` provides the real
//! implementation and tests plug in scripted sessions.

use crate::retry::CallError;

/// A message as the remote service labels it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMessage {
    /// Remote role label (e.g. "user", "model").
    pub role: String,
    pub text: String,
}

impl RemoteMessage {
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            text: text.into(),
        }
    }
}

/// One chat session on the remote service.
///
/// `send` performs exactly one remote call. A session only records the user
/// message and the reply in its own history when the call succeeds.
pub trait ChatSession: Send {
    fn send(&mut self, text: &str) -> Result<RemoteMessage, CallError>;

    fn history(&self) -> &[RemoteMessage];
}

/// A configured model that can open chat sessions.
pub trait GenerativeModel {
    type Session: ChatSession;

    fn start_chat(&self, history: Vec<RemoteMessage>) -> Self::Session;
}
