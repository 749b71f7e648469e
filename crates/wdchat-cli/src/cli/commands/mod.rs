//! CLI command handlers. Each command is in its own file.

mod ask;
mod chat;
mod completions;
mod man;
mod show_config;

pub use ask::run_ask;
pub use chat::run_chat;
pub use completions::run_completions;
pub use man::run_man;
pub use show_config::run_show_config;

use anyhow::Result;
use wdchat_core::config::ChatConfig;
use wdchat_core::dispatcher::{ChatDispatcher, ConfigError};
use wdchat_core::gemini::GeminiSession;

/// Start a session, turning configuration errors into actionable messages.
fn open_dispatcher(cfg: &ChatConfig) -> Result<ChatDispatcher<GeminiSession>> {
    ChatDispatcher::from_config(cfg).map_err(|e| match e {
        ConfigError::MissingKey => anyhow::anyhow!(
            "{} is not set; export your Gemini API key to start chatting",
            cfg.api_key_env
        ),
        other => anyhow::Error::new(other),
    })
}
