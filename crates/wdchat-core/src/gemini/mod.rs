//! Google Gemini `generateContent` client.
//!
//! Uses the curl crate (libcurl) for a blocking JSON POST per message. The
//! chat session is kept client-side: every request carries the full history,
//! and the history only grows when a call succeeds.

mod parse;

use anyhow::{Context, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::conversation::USER_ROLE;
use crate::remote::{ChatSession, GenerativeModel, RemoteMessage};
use crate::retry::CallError;

/// Where and how to reach the model.
#[derive(Debug, Clone)]
pub struct GeminiOptions {
    /// API base, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub endpoint: String,
    pub model: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

struct Transport {
    url: Url,
    api_key: String,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("url", &self.url.as_str())
            .field("api_key", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Configured client for one model. Cheap to clone.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    transport: Arc<Transport>,
}

impl GeminiClient {
    /// Validate the key and build the `:generateContent` URL. No network I/O.
    pub fn new(api_key: &str, opts: &GeminiOptions) -> Result<Self> {
        validate_api_key(api_key)?;
        let url = generate_content_url(&opts.endpoint, &opts.model)?;
        tracing::debug!(url = %url, "gemini client configured");
        Ok(Self {
            transport: Arc::new(Transport {
                url,
                api_key: api_key.to_string(),
                connect_timeout: opts.connect_timeout,
                request_timeout: opts.request_timeout,
            }),
        })
    }

    pub fn url(&self) -> &Url {
        &self.transport.url
    }
}

impl GenerativeModel for GeminiClient {
    type Session = GeminiSession;

    fn start_chat(&self, history: Vec<RemoteMessage>) -> GeminiSession {
        GeminiSession {
            transport: Arc::clone(&self.transport),
            history,
        }
    }
}

/// Client-side chat session.
#[derive(Debug)]
pub struct GeminiSession {
    transport: Arc<Transport>,
    history: Vec<RemoteMessage>,
}

impl ChatSession for GeminiSession {
    fn send(&mut self, text: &str) -> Result<RemoteMessage, CallError> {
        let user = RemoteMessage::new(USER_ROLE, text);
        let body = parse::encode_request(&self.history, &user)?;
        tracing::trace!(body = %String::from_utf8_lossy(&body), "generateContent request");
        let (code, response) = self.transport.post(&body)?;
        tracing::trace!(body = %String::from_utf8_lossy(&response), "generateContent response");
        if !(200..300).contains(&code) {
            return Err(parse::decode_error(code, &response));
        }
        let reply = parse::decode_reply(&response)?;
        self.history.push(user);
        self.history.push(reply.clone());
        Ok(reply)
    }

    fn history(&self) -> &[RemoteMessage] {
        &self.history
    }
}

impl Transport {
    /// POST `body` as JSON. Runs in the current thread.
    fn post(&self, body: &[u8]) -> Result<(u32, Vec<u8>), curl::Error> {
        let mut response = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(self.url.as_str())?;
        easy.post(true)?;
        easy.post_fields_copy(body)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.request_timeout)?;

        let mut list = curl::easy::List::new();
        list.append("Content-Type: application/json")?;
        list.append(&format!("x-goog-api-key: {}", self.api_key))?;
        // Disable 100-continue; the API answers directly.
        list.append("Expect:")?;
        easy.http_headers(list)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                response.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        tracing::debug!(code, bytes = response.len(), "generateContent response");
        Ok((code, response))
    }
}

fn validate_api_key(key: &str) -> Result<()> {
    if key.is_empty() {
        anyhow::bail!("API key is empty");
    }
    if !key.chars().all(|c| c.is_ascii_graphic()) {
        anyhow::bail!("API key contains whitespace or non-printable characters");
    }
    Ok(())
}

/// `{endpoint}/models/{model}:generateContent`
fn generate_content_url(endpoint: &str, model: &str) -> Result<Url> {
    let mut url = Url::parse(endpoint).with_context(|| format!("invalid endpoint {endpoint:?}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("endpoint must be http or https, got {}", url.scheme());
    }
    let model = model.trim().trim_start_matches("models/");
    if model.is_empty() || model.contains('/') {
        anyhow::bail!("invalid model name {model:?}");
    }
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("endpoint cannot be a base URL"))?
        .pop_if_empty()
        .push("models")
        .push(&format!("{model}:generateContent"));
    Ok(url)
}
