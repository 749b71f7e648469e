use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dispatcher::ConfigError;
use crate::gemini::GeminiOptions;
use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per message.
    pub max_retries: u32,
    /// Base of the exponential backoff in seconds (delay = base ^ attempt).
    pub base_delay_secs: f64,
    /// Maximum single backoff delay in seconds.
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

fn default_max_delay_secs() -> u64 {
    60
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_secs: 2.0,
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

impl RetryConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.base_delay_secs.is_finite() && self.base_delay_secs > 0.0) {
            anyhow::bail!(
                "retry.base_delay_secs must be a positive number, got {}",
                self.base_delay_secs
            );
        }
        Ok(())
    }
}

/// Global configuration loaded from `~/.config/wdchat/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Gemini model name.
    pub model: String,
    /// Base URL of the Generative Language API.
    pub endpoint: String,
    /// Environment variable holding the API key. The key itself is never stored here.
    pub api_key_env: String,
    /// Show internal error text next to the generic error message.
    #[serde(default)]
    pub show_error_details: bool,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_connect_timeout_secs() -> u64 {
    15
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "gemini-pro".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            show_error_details: false,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            retry: None,
        }
    }
}

impl ChatConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryPolicy::from)
            .unwrap_or_default()
    }

    pub fn gemini_options(&self) -> GeminiOptions {
        GeminiOptions {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingKey)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            anyhow::bail!("model must not be empty");
        }
        if let Some(retry) = &self.retry {
            retry.validate()?;
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("wdchat")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load `KEY=value` pairs from a `.env` file in the working directory or one
/// of its parents. Variables already set in the environment are kept.
/// Returns the file that was read, if any.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Like `load_dotenv` but for an explicit file.
pub fn load_dotenv_from(path: &Path) -> Result<()> {
    dotenvy::from_path(path).with_context(|| format!("read {}", path.display()))
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ChatConfig> {
    load_or_init_at(&config_path()?)
}

/// Like `load_or_init` but for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<ChatConfig> {
    if !path.exists() {
        let default_cfg = ChatConfig::default();
        let toml = default_cfg.to_toml()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ChatConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
