//! Encode `generateContent` requests and decode replies and error bodies.

use serde::{Deserialize, Serialize};

use crate::conversation::MODEL_ROLE;
use crate::remote::RemoteMessage;
use crate::retry::{is_resource_exhausted, CallError};

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

/// Serialize the conversation so far plus the new user message.
pub(crate) fn encode_request(
    history: &[RemoteMessage],
    next: &RemoteMessage,
) -> Result<Vec<u8>, CallError> {
    let contents = history
        .iter()
        .chain(std::iter::once(next))
        .map(|m| Content {
            role: &m.role,
            parts: [Part { text: &m.text }],
        })
        .collect();
    Ok(serde_json::to_vec(&GenerateContentRequest { contents })?)
}

/// Extract the first candidate's text from a 2xx body.
pub(crate) fn decode_reply(body: &[u8]) -> Result<RemoteMessage, CallError> {
    let resp: GenerateContentResponse = serde_json::from_slice(body)
        .map_err(|e| CallError::InvalidResponse(format!("malformed body: {e}")))?;

    let Some(candidate) = resp.candidates.into_iter().next() else {
        let reason = resp
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(CallError::InvalidResponse(format!("prompt blocked: {reason}")));
    };

    let finish = candidate
        .finish_reason
        .unwrap_or_else(|| "unknown".to_string());
    let content = candidate.content.ok_or_else(|| {
        CallError::InvalidResponse(format!("candidate has no content (finish reason {finish})"))
    })?;

    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.is_empty() {
        return Err(CallError::InvalidResponse(format!(
            "candidate has no text (finish reason {finish})"
        )));
    }

    // Older API versions omit the role on candidates.
    let role = if content.role.is_empty() {
        MODEL_ROLE.to_string()
    } else {
        content.role
    };
    Ok(RemoteMessage { role, text })
}

/// Map a non-2xx response to a call error, recognizing quota exhaustion.
pub(crate) fn decode_error(code: u32, body: &[u8]) -> CallError {
    let (message, status) = match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(env) => (env.error.message, env.error.status),
        Err(_) => (String::from_utf8_lossy(body).trim().to_string(), None),
    };
    if is_resource_exhausted(code, status.as_deref()) {
        CallError::ResourceExhausted(message)
    } else {
        CallError::Http {
            status: code,
            message,
        }
    }
}
