//! One chat conversation: owns the session and history, mediates every call
//! to the generation service.
//!
//! `send` runs the remote call through the retry policy and records the user
//! and assistant turns only when the call succeeds, so the history always
//! alternates User, Assistant starting with User.

mod error;

use std::time::Duration;

pub use error::{ConfigError, DispatchError, RATE_LIMITED_MESSAGE, UNEXPECTED_MESSAGE};

use crate::config::ChatConfig;
use crate::conversation::{ConversationHistory, ConversationRole, ConversationTurn};
use crate::gemini::{GeminiClient, GeminiSession};
use crate::remote::{ChatSession, GenerativeModel};
use crate::retry::{
    self, ErrorKind, RetryEvent, RetryOutcome, RetryPolicy, Sleeper, ThreadSleeper,
};

/// Where a `send` call currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    /// Remote call in flight (attempt is 1-based).
    Sending { attempt: u32 },
    /// Rate limited; waiting before the next attempt.
    RetryWait { attempt: u32, delay: Duration },
    Success,
    Fatal,
}

pub struct ChatDispatcher<S: ChatSession> {
    session: S,
    history: ConversationHistory,
    policy: RetryPolicy,
    sleeper: Box<dyn Sleeper + Send>,
}

impl<S: ChatSession> ChatDispatcher<S> {
    /// Build a dispatcher with an empty history.
    ///
    /// `connect` constructs the model client from the (non-empty) key.
    pub fn initialize<M, F>(api_key: &str, connect: F) -> Result<Self, ConfigError>
    where
        M: GenerativeModel<Session = S>,
        F: FnOnce(&str) -> anyhow::Result<M>,
    {
        let key = api_key.trim();
        if key.is_empty() {
            return Err(ConfigError::MissingKey);
        }
        let model = connect(key).map_err(ConfigError::ClientInitFailed)?;
        Ok(Self::from_session(model.start_chat(Vec::new())))
    }

    /// Wrap an already open session. Its prior messages are not replayed into
    /// the history.
    pub fn from_session(session: S) -> Self {
        Self {
            session,
            history: ConversationHistory::new(),
            policy: RetryPolicy::default(),
            sleeper: Box::new(ThreadSleeper),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sleeper(mut self, sleeper: impl Sleeper + Send + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Send one prompt and return the assistant's turn.
    pub fn send(&mut self, prompt: &str) -> Result<ConversationTurn, DispatchError> {
        self.send_observed(prompt, |_| {})
    }

    /// Like `send` but reports state transitions (for a pending indicator).
    pub fn send_observed<O>(
        &mut self,
        prompt: &str,
        mut observer: O,
    ) -> Result<ConversationTurn, DispatchError>
    where
        O: FnMut(DispatchState),
    {
        let session = &mut self.session;
        let outcome = retry::execute_with_retry_observed(
            &self.policy,
            self.sleeper.as_mut(),
            || session.send(prompt),
            |event| {
                let state = match event {
                    RetryEvent::Attempt(attempt) => DispatchState::Sending { attempt },
                    RetryEvent::Backoff { attempt, delay } => {
                        DispatchState::RetryWait { attempt, delay }
                    }
                };
                tracing::debug!(?state, "dispatch state");
                observer(state);
            },
        );

        let result = match outcome {
            RetryOutcome::Success(reply) => {
                self.history.push(ConversationRole::User, prompt);
                let role = ConversationRole::from_remote_label(&reply.role);
                if role != ConversationRole::Assistant {
                    tracing::warn!(label = %reply.role, "reply has a non-model role label");
                }
                Ok(self.history.push(role, reply.text).clone())
            }
            RetryOutcome::FatalFailure(cause)
                if retry::classify(&cause) == ErrorKind::ResourceExhausted =>
            {
                tracing::warn!(
                    max_retries = self.policy.max_retries,
                    error = %cause,
                    "still rate limited after retries"
                );
                Err(DispatchError::RateLimited)
            }
            // The loop never returns this; treat it as exhausted retries.
            RetryOutcome::TransientFailure { attempts_used, .. } => {
                tracing::warn!(attempts_used, "retry loop ended on a transient failure");
                Err(DispatchError::RateLimited)
            }
            RetryOutcome::FatalFailure(cause) => {
                tracing::error!(error = %cause, "message dispatch failed");
                Err(DispatchError::Unexpected(cause))
            }
        };

        let end = if result.is_ok() {
            DispatchState::Success
        } else {
            DispatchState::Fatal
        };
        tracing::debug!(state = ?end, turns = self.history.len(), "dispatch finished");
        observer(end);
        observer(DispatchState::Idle);
        result
    }
}

impl ChatDispatcher<GeminiSession> {
    /// Build a Gemini-backed dispatcher from config, reading the API key from
    /// the configured environment variable.
    pub fn from_config(cfg: &ChatConfig) -> Result<Self, ConfigError> {
        let key = cfg.api_key()?;
        let opts = cfg.gemini_options();
        let dispatcher = Self::initialize(&key, |k| GeminiClient::new(k, &opts))?;
        tracing::info!(model = %cfg.model, "chat session started");
        Ok(dispatcher.with_retry_policy(cfg.retry_policy()))
    }
}
