//! `wdchat chat` – interactive conversation loop.

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use wdchat_core::config::ChatConfig;

use super::open_dispatcher;
use crate::cli::pending::send_with_indicator;
use crate::cli::render;

/// What the loop should do with one line of input.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum InputAction {
    Quit,
    ShowHistory,
    Skip,
    Send,
}

pub(crate) fn classify_input(line: &str) -> InputAction {
    match line.trim() {
        "/quit" | "/exit" => InputAction::Quit,
        "/history" => InputAction::ShowHistory,
        "" => InputAction::Skip,
        _ => InputAction::Send,
    }
}

pub async fn run_chat(cfg: &ChatConfig) -> Result<()> {
    let mut dispatcher = open_dispatcher(cfg)?;
    println!("{}\n", render::BANNER);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        match classify_input(&line) {
            InputAction::Quit => break,
            InputAction::Skip => continue,
            InputAction::ShowHistory => {
                println!("{}\n", render::format_history(dispatcher.history()));
                continue;
            }
            InputAction::Send => {}
        }

        let (d, result) = send_with_indicator(dispatcher, line).await?;
        dispatcher = d;
        match result {
            Ok(turn) => println!("{}\n", render::format_turn(&turn)),
            Err(err) => println!("{}\n", render::format_error(&err, cfg.show_error_details)),
        }
    }

    tracing::info!(turns = dispatcher.history().len(), "chat session ended");
    Ok(())
}
