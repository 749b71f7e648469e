//! Run one blocking `send` on a worker thread while a ticker shows progress.

use std::time::Duration;

use anyhow::Result;
use wdchat_core::conversation::ConversationTurn;
use wdchat_core::dispatcher::{ChatDispatcher, DispatchError, DispatchState};
use wdchat_core::gemini::GeminiSession;

const TICK: Duration = Duration::from_millis(400);
const FRAMES: [&str; 4] = ["   ", ".  ", ".. ", "..."];

/// Status text for the pending line, or None to keep the current one.
pub(crate) fn status_for(state: DispatchState) -> Option<String> {
    match state {
        DispatchState::Sending { attempt: 1 } => Some("thinking".to_string()),
        DispatchState::Sending { attempt } => Some(format!("thinking (attempt {attempt})")),
        DispatchState::RetryWait { delay, .. } => Some(format!(
            "rate limited, retrying in {}s",
            delay.as_secs_f64().ceil() as u64
        )),
        DispatchState::Idle | DispatchState::Success | DispatchState::Fatal => None,
    }
}

/// Send `prompt` and hand the dispatcher back together with the result.
pub async fn send_with_indicator(
    mut dispatcher: ChatDispatcher<GeminiSession>,
    prompt: String,
) -> Result<(
    ChatDispatcher<GeminiSession>,
    Result<ConversationTurn, DispatchError>,
)> {
    let (state_tx, mut state_rx) = tokio::sync::mpsc::unbounded_channel::<DispatchState>();

    let worker = tokio::task::spawn_blocking(move || {
        let result = dispatcher.send_observed(&prompt, |state| {
            let _ = state_tx.send(state);
        });
        (dispatcher, result)
    });

    let indicator = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(TICK);
        let mut status = "thinking".to_string();
        let mut frame = 0usize;
        let mut drawn = false;
        loop {
            tokio::select! {
                state = state_rx.recv() => match state {
                    Some(state) => {
                        if let Some(s) = status_for(state) {
                            status = s;
                        }
                    }
                    // Worker finished and dropped the sender.
                    None => break,
                },
                _ = ticker.tick() => {
                    eprint!("\r\x1b[2K{}{}", status, FRAMES[frame % FRAMES.len()]);
                    frame += 1;
                    drawn = true;
                }
            }
        }
        if drawn {
            eprint!("\r\x1b[2K");
        }
    });

    let (dispatcher, result) = worker.await?;
    let _ = indicator.await;
    Ok((dispatcher, result))
}
