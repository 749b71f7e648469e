//! Retry loop: run a closure until success or policy says stop.

use std::time::Duration;

use super::classify;
use super::error::CallError;
use super::policy::{RetryDecision, RetryPolicy};

/// Tagged result of one attempt, and of the whole loop.
///
/// The loop only ever returns `Success` or `FatalFailure`; `TransientFailure`
/// is the per-attempt outcome that leads to a backoff wait.
#[derive(Debug)]
pub enum RetryOutcome<T> {
    Success(T),
    /// Transient failure after `attempts_used` attempts; retry after `delay`.
    TransientFailure { attempts_used: u32, delay: Duration },
    /// Non-retryable error, or the last transient error once retries ran out.
    FatalFailure(CallError),
}

/// Progress reported by the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryEvent {
    /// About to make this (1-based) attempt.
    Attempt(u32),
    /// Attempt failed transiently; waiting `delay` before the next one.
    Backoff { attempt: u32, delay: Duration },
}

/// Suspends the caller between attempts.
pub trait Sleeper {
    fn sleep(&mut self, delay: Duration);
}

/// Blocks the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

impl<F: FnMut(Duration)> Sleeper for F {
    fn sleep(&mut self, delay: Duration) {
        self(delay)
    }
}

impl RetryPolicy {
    /// Tag the result of attempt number `attempt`.
    pub fn assess<T>(&self, attempt: u32, result: Result<T, CallError>) -> RetryOutcome<T> {
        match result {
            Ok(value) => RetryOutcome::Success(value),
            Err(e) => match self.decide(attempt, classify::classify(&e)) {
                RetryDecision::NoRetry => RetryOutcome::FatalFailure(e),
                RetryDecision::RetryAfter(delay) => {
                    tracing::debug!(attempt, error = %e, "transient failure");
                    RetryOutcome::TransientFailure {
                        attempts_used: attempt,
                        delay,
                    }
                }
            },
        }
    }
}

/// Runs `op` until it succeeds or the retry policy says to stop.
/// On a transient failure, sleeps for the backoff duration then tries again.
pub fn execute_with_retry<T, F>(
    policy: &RetryPolicy,
    sleeper: &mut dyn Sleeper,
    op: F,
) -> RetryOutcome<T>
where
    F: FnMut() -> Result<T, CallError>,
{
    execute_with_retry_observed(policy, sleeper, op, |_| {})
}

/// Like `execute_with_retry` but reports each attempt and backoff to `on_event`.
pub fn execute_with_retry_observed<T, F, E>(
    policy: &RetryPolicy,
    sleeper: &mut dyn Sleeper,
    mut op: F,
    mut on_event: E,
) -> RetryOutcome<T>
where
    F: FnMut() -> Result<T, CallError>,
    E: FnMut(RetryEvent),
{
    let mut attempt = 1u32;
    loop {
        on_event(RetryEvent::Attempt(attempt));
        match policy.assess(attempt, op()) {
            RetryOutcome::TransientFailure {
                attempts_used: used,
                delay,
            } => {
                tracing::warn!(
                    attempt = used,
                    delay_secs = delay.as_secs_f64(),
                    "resource exhausted, backing off"
                );
                on_event(RetryEvent::Backoff {
                    attempt: used,
                    delay,
                });
                sleeper.sleep(delay);
                attempt = used.saturating_add(1);
            }
            terminal => return terminal,
        }
    }
}
