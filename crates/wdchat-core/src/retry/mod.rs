//! Retry and backoff policy.
//!
//! This module encapsulates error classification (resource exhaustion vs
//! everything else) and exponential backoff decisions so the dispatcher only
//! sees a final success or a final failure.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, is_resource_exhausted, RESOURCE_EXHAUSTED_STATUS};
pub use error::CallError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::{
    execute_with_retry, execute_with_retry_observed, RetryEvent, RetryOutcome, Sleeper,
    ThreadSleeper,
};
