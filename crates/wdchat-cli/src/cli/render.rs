//! Plain-text rendering of turns, history and errors.

use std::fmt::Write as _;

use wdchat_core::conversation::{ConversationHistory, ConversationRole, ConversationTurn};
use wdchat_core::dispatcher::DispatchError;

pub const BANNER: &str = "\
WD Bing Gallage
This is WD Chatbot. Made by Dinith Wishwajith Gallage.
Type what you want to know below. /history shows the conversation, /quit exits.";

pub fn role_label(role: ConversationRole) -> &'static str {
    match role {
        ConversationRole::User => "you",
        ConversationRole::Assistant => "assistant",
    }
}

/// `label> text`, with continuation lines indented under the text.
pub fn format_turn(turn: &ConversationTurn) -> String {
    let label = role_label(turn.role());
    let indent = " ".repeat(label.len() + 2);
    let mut out = String::new();
    for (i, line) in turn.text().lines().enumerate() {
        if i == 0 {
            let _ = write!(out, "{label}> {line}");
        } else {
            let _ = write!(out, "\n{indent}{line}");
        }
    }
    if out.is_empty() {
        out = format!("{label}>");
    }
    out
}

pub fn format_history(history: &ConversationHistory) -> String {
    if history.is_empty() {
        return "(no messages yet)".to_string();
    }
    history
        .iter()
        .map(format_turn)
        .collect::<Vec<_>>()
        .join("\n")
}

/// User-facing text, plus the internal cause only in diagnostic mode.
pub fn format_error(err: &DispatchError, show_details: bool) -> String {
    let mut out = format!("assistant> {}", err.user_message());
    if show_details {
        if let Some(details) = err.details() {
            let _ = write!(out, "\n  (details: {details})");
        }
    }
    out
}
