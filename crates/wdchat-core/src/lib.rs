pub mod config;
pub mod logging;

pub mod conversation;
pub mod dispatcher;
pub mod gemini;
pub mod remote;
pub mod retry;
