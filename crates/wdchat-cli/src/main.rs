use clap::Parser;
use wdchat_core::config;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // A `.env` next to the user may hold the API key; a missing file is fine.
    config::load_dotenv();

    if let Err(err) = cli.run().await {
        eprintln!("wdchat error: {:#}", err);
        std::process::exit(1);
    }
}
