//! `wdchat ask` – send one prompt and print the reply.

use anyhow::Result;
use wdchat_core::config::ChatConfig;
use wdchat_core::dispatcher::DispatchError;

use super::open_dispatcher;
use crate::cli::pending::send_with_indicator;
use crate::cli::render;

pub async fn run_ask(cfg: &ChatConfig, prompt: String) -> Result<()> {
    let dispatcher = open_dispatcher(cfg)?;
    let (_, result) = send_with_indicator(dispatcher, prompt).await?;
    match result {
        Ok(turn) => {
            println!("{}", turn.text());
            Ok(())
        }
        Err(err) => {
            let (text, exit_err) = failure_report(&err, cfg.show_error_details);
            eprintln!("{text}");
            Err(exit_err)
        }
    }
}

/// Text for stderr plus the error handed to `main` for the exit code.
///
/// The returned error never carries the cause; only the rendered text does,
/// and only in diagnostic mode.
pub(crate) fn failure_report(err: &DispatchError, show_details: bool) -> (String, anyhow::Error) {
    (
        render::format_error(err, show_details),
        anyhow::anyhow!("message not delivered"),
    )
}
