//! CLI for the wdchat Gemini chat.

mod commands;
mod pending;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use wdchat_core::config::{self, ChatConfig};
use wdchat_core::logging;

use commands::{run_ask, run_chat, run_completions, run_man, run_show_config};

/// Top-level CLI for wdchat.
#[derive(Debug, Parser)]
#[command(name = "wdchat")]
#[command(about = "wdchat: chat with Google Gemini from the terminal", long_about = None)]
pub struct Cli {
    /// Model to talk to (overrides `model` in config.toml).
    #[arg(long, global = true, value_name = "NAME")]
    pub model: Option<String>,

    /// Show internal error details and log at trace level.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Interactive chat (default).
    Chat,

    /// Send a single prompt and print the reply.
    Ask {
        /// Prompt text.
        prompt: String,
    },

    /// Show the config file path and effective settings.
    Config,

    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Print the man page.
    Man,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Some(CliCommand::Completions { shell }) => return run_completions(shell),
            Some(CliCommand::Man) => return run_man(),
            _ => {}
        }

        let mut cfg = config::load_or_init()?;
        apply_overrides(&mut cfg, self.model.as_deref(), self.debug);
        start_logging(&cfg);
        tracing::debug!("loaded config: {:?}", cfg);

        match self.command.unwrap_or(CliCommand::Chat) {
            CliCommand::Chat => run_chat(&cfg).await?,
            CliCommand::Ask { prompt } => run_ask(&cfg, prompt).await?,
            CliCommand::Config => run_show_config(&cfg)?,
            CliCommand::Completions { .. } | CliCommand::Man => {}
        }

        Ok(())
    }
}

/// Command-line flags win over config.toml.
pub(crate) fn apply_overrides(cfg: &mut ChatConfig, model: Option<&str>, debug: bool) {
    if let Some(model) = model {
        cfg.model = model.to_string();
    }
    if debug {
        cfg.show_error_details = true;
    }
}

/// `--debug` or `show_error_details = true` in config.toml.
pub(crate) fn diagnostic_logging(cfg: &ChatConfig) -> bool {
    cfg.show_error_details
}

/// Runs after the config is loaded; falls back to stderr if the state dir is unusable.
fn start_logging(cfg: &ChatConfig) {
    if logging::init_logging(diagnostic_logging(cfg)).is_err() {
        logging::init_logging_stderr();
    }
}

#[cfg(test)]
mod tests;
