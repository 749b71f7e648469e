//! Classify HTTP status and remote-call errors into retry policy error kinds.

use super::error::CallError;
use super::policy::ErrorKind;

/// Status string the Gemini API puts in error bodies for quota/rate limits.
pub const RESOURCE_EXHAUSTED_STATUS: &str = "RESOURCE_EXHAUSTED";

/// True when an HTTP error response means the quota or rate limit was hit.
///
/// `api_status` is the `error.status` field of the JSON error body, if any.
pub fn is_resource_exhausted(code: u32, api_status: Option<&str>) -> bool {
    code == 429
        || api_status
            .map(|s| s.eq_ignore_ascii_case(RESOURCE_EXHAUSTED_STATUS))
            .unwrap_or(false)
}

/// Classify a remote-call error into an ErrorKind.
pub fn classify(e: &CallError) -> ErrorKind {
    match e {
        CallError::ResourceExhausted(_) => ErrorKind::ResourceExhausted,
        CallError::Http { status: 429, .. } => ErrorKind::ResourceExhausted,
        CallError::Http { .. }
        | CallError::Transport(_)
        | CallError::Encode(_)
        | CallError::InvalidResponse(_) => ErrorKind::Other,
    }
}
