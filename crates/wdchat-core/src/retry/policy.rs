use std::time::Duration;

use crate::config::RetryConfig;

/// High-level classification of a remote-call error for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Service asked us to slow down (quota / rate limit).
    ResourceExhausted,
    /// Any other error (never retried).
    Other,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Bounded exponential backoff for resource-exhaustion errors.
///
/// The delay before retry `n` is `base_delay_secs ^ n` seconds (2, 4, 8 for a
/// base of 2), clamped to `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts the loop makes; 0 still attempts once.
    pub max_retries: u32,
    /// Base of the exponential backoff, in seconds. Must be > 0.
    pub base_delay_secs: f64,
    /// Upper bound on a single backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_secs: 2.0,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            base_delay_secs: cfg.base_delay_secs,
            max_delay: Duration::from_secs(cfg.max_delay_secs),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given (1-based) failed attempt.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let raw = self.base_delay_secs.powi(exp);
        let max = self.max_delay.as_secs_f64();
        // powi can overflow to inf; NaN only for a NaN base.
        let secs = if raw.is_nan() { max } else { raw.clamp(0.0, max) };
        Duration::from_secs_f64(secs)
    }

    /// Decide whether to retry after `attempt` attempts have been made and the
    /// last one failed with `kind`.
    ///
    /// `attempt` is 1-based (1 = first attempt). Returns `RetryDecision::NoRetry`
    /// when we should stop retrying.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        match kind {
            ErrorKind::Other => RetryDecision::NoRetry,
            ErrorKind::ResourceExhausted if attempt >= self.max_retries => RetryDecision::NoRetry,
            ErrorKind::ResourceExhausted => RetryDecision::RetryAfter(self.backoff(attempt)),
        }
    }
}
