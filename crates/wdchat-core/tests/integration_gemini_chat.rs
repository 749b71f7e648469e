//! Integration test: the dispatcher driving the real curl client against a
//! local stand-in for the Gemini API, including rate-limit retries.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::gemini_server::{self, invalid_key, quota_exceeded, reply};
use wdchat_core::config::ChatConfig;
use wdchat_core::conversation::ConversationRole;
use wdchat_core::dispatcher::{ChatDispatcher, ConfigError, DispatchError};
use wdchat_core::gemini::{GeminiClient, GeminiOptions, GeminiSession};
use wdchat_core::remote::ChatSession;
use wdchat_core::retry::{CallError, RetryPolicy};

fn options(endpoint: &str) -> GeminiOptions {
    GeminiOptions {
        endpoint: endpoint.to_string(),
        model: "gemini-pro".to_string(),
        connect_timeout: Duration::from_secs(5),
        request_timeout: Duration::from_secs(5),
    }
}

fn dispatcher(endpoint: &str, waits: Arc<Mutex<Vec<Duration>>>) -> ChatDispatcher<GeminiSession> {
    let opts = options(endpoint);
    ChatDispatcher::initialize("test-api-key", |k| GeminiClient::new(k, &opts))
        .expect("initialize")
        .with_retry_policy(RetryPolicy::default())
        .with_sleeper(move |d: Duration| waits.lock().unwrap().push(d))
}

#[test]
fn conversation_carries_history_to_the_server() {
    let server = gemini_server::start(vec![reply("Hi! How can I help?"), reply("Paris.")]);
    let waits = Arc::new(Mutex::new(Vec::new()));
    let mut d = dispatcher(&server.endpoint, Arc::clone(&waits));

    let first = d.send("Hello").unwrap();
    assert_eq!(first.text(), "Hi! How can I help?");
    let second = d.send("Capital of France?").unwrap();
    assert_eq!(second.text(), "Paris.");
    assert_eq!(second.role(), ConversationRole::Assistant);
    assert_eq!(d.history().len(), 4);
    assert!(waits.lock().unwrap().is_empty());

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0]
        .request_line
        .starts_with("POST /v1beta/models/gemini-pro:generateContent"));
    assert_eq!(requests[0].header("x-goog-api-key"), Some("test-api-key"));

    let contents = requests[1].json()["contents"].as_array().unwrap().clone();
    assert_eq!(contents.len(), 3);
    assert_eq!(contents[0]["role"], "user");
    assert_eq!(contents[0]["parts"][0]["text"], "Hello");
    assert_eq!(contents[1]["role"], "model");
    assert_eq!(contents[2]["parts"][0]["text"], "Capital of France?");
}

#[test]
fn rate_limit_recovers_within_budget() {
    let server = gemini_server::start(vec![quota_exceeded(), quota_exceeded(), reply("Done")]);
    let waits = Arc::new(Mutex::new(Vec::new()));
    let mut d = dispatcher(&server.endpoint, Arc::clone(&waits));

    let turn = d.send("Hello").unwrap();
    assert_eq!(turn.text(), "Done");
    assert_eq!(
        *waits.lock().unwrap(),
        vec![Duration::from_secs(2), Duration::from_secs(4)]
    );
    assert_eq!(server.requests().len(), 3);
    // Failed attempts must not leak into the session history.
    assert_eq!(d.session().history().len(), 2);
}

#[test]
fn rate_limit_beyond_budget_is_reported() {
    let server = gemini_server::start(vec![
        quota_exceeded(),
        quota_exceeded(),
        quota_exceeded(),
        quota_exceeded(),
        reply("too late"),
    ]);
    let waits = Arc::new(Mutex::new(Vec::new()));
    let mut d = dispatcher(&server.endpoint, Arc::clone(&waits));

    let err = d.send("Hello").unwrap_err();
    assert!(matches!(err, DispatchError::RateLimited));
    assert!(d.history().is_empty());
    assert!(d.session().history().is_empty());
    assert_eq!(server.requests().len(), 3);
}

#[test]
fn invalid_key_is_unexpected_and_not_retried() {
    let server = gemini_server::start(vec![invalid_key(), reply("unused")]);
    let waits = Arc::new(Mutex::new(Vec::new()));
    let mut d = dispatcher(&server.endpoint, Arc::clone(&waits));

    match d.send("Hello") {
        Err(DispatchError::Unexpected(CallError::Http { status, message })) => {
            assert_eq!(status, 400);
            assert!(message.contains("API key not valid"));
        }
        other => panic!("expected Unexpected(Http 400), got {other:?}"),
    }
    assert_eq!(server.requests().len(), 1);
    assert!(waits.lock().unwrap().is_empty());
}

#[test]
fn unreachable_server_is_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let opts = options(&format!("http://127.0.0.1:{port}/v1beta"));
    let client = GeminiClient::new("k", &opts).unwrap();
    let mut session = wdchat_core::remote::GenerativeModel::start_chat(&client, Vec::new());
    assert!(matches!(
        session.send("Hello"),
        Err(CallError::Transport(_))
    ));
}

#[test]
fn from_config_requires_key_in_env() {
    let cfg = ChatConfig {
        api_key_env: "WDCHAT_INTEGRATION_UNSET_KEY".to_string(),
        ..ChatConfig::default()
    };
    std::env::remove_var("WDCHAT_INTEGRATION_UNSET_KEY");
    assert!(matches!(
        ChatDispatcher::from_config(&cfg),
        Err(ConfigError::MissingKey)
    ));
}

#[test]
fn from_config_with_bad_endpoint_fails_init() {
    let cfg = ChatConfig {
        api_key_env: "WDCHAT_INTEGRATION_BAD_ENDPOINT_KEY".to_string(),
        endpoint: "ftp://example.com".to_string(),
        ..ChatConfig::default()
    };
    std::env::set_var("WDCHAT_INTEGRATION_BAD_ENDPOINT_KEY", "some-key");
    assert!(matches!(
        ChatDispatcher::from_config(&cfg),
        Err(ConfigError::ClientInitFailed(_))
    ));
}
