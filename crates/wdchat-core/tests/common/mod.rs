#![allow(dead_code)]

pub mod gemini_server;
