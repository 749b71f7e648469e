//! `wdchat config` – show where the config lives and what is in effect.

use anyhow::Result;
use wdchat_core::config::{self, ChatConfig};

pub fn run_show_config(cfg: &ChatConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", cfg.to_toml()?);
    let key_state = if cfg.api_key().is_ok() { "set" } else { "not set" };
    println!("# {} is {}", cfg.api_key_env, key_state);
    Ok(())
}
