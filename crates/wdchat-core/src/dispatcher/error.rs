//! Errors surfaced by the dispatcher to the UI layer.

use thiserror::Error;

use crate::retry::CallError;

/// Message shown when the service keeps rate limiting us.
pub const RATE_LIMITED_MESSAGE: &str = "I'm sorry, but I've reached my usage limit for now. \
     Please try again later or with a shorter message.";

/// Generic message for every other failure.
pub const UNEXPECTED_MESSAGE: &str =
    "I encountered an error. Please try again with a different question.";

/// The dispatcher could not be set up; no chat is possible.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API key is missing; set it in the environment")]
    MissingKey,
    #[error("failed to initialize the model client: {0:#}")]
    ClientInitFailed(anyhow::Error),
}

/// A message could not be delivered. History is unchanged.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Still rate limited after the retry budget was spent.
    #[error("rate limited by the model service")]
    RateLimited,
    #[error("unexpected error")]
    Unexpected(#[source] CallError),
}

impl DispatchError {
    /// Text meant for end users; never includes internal error detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            DispatchError::RateLimited => RATE_LIMITED_MESSAGE,
            DispatchError::Unexpected(_) => UNEXPECTED_MESSAGE,
        }
    }

    /// Internal cause, for diagnostic mode only.
    pub fn details(&self) -> Option<String> {
        match self {
            DispatchError::RateLimited => None,
            DispatchError::Unexpected(cause) => Some(cause.to_string()),
        }
    }
}
