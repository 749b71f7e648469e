//! Remote-call error type for retry classification.

use thiserror::Error;

/// Error returned by a single call to the generation service.
/// Used so we can classify and decide retries before the dispatcher maps it
/// into a user-facing error.
#[derive(Debug, Error)]
pub enum CallError {
    /// Quota or rate limit hit (HTTP 429 / `RESOURCE_EXHAUSTED`). Retried with backoff.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
    /// Response had a non-2xx status that is not throttling.
    #[error("HTTP {status}: {message}")]
    Http { status: u32, message: String },
    /// Curl reported an error (timeout, connection, TLS, etc.).
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),
    /// Request body could not be encoded.
    #[error("encode request: {0}")]
    Encode(#[from] serde_json::Error),
    /// Body was not a usable reply (malformed JSON, blocked prompt, no text).
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
