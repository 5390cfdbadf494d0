// relaychat/src/main.rs
//! relaychat entry point.
//!
//! Loads `.env`, sets up logging, loads the configuration and runs the chosen
//! subcommand against stdout.

use anyhow::Result;
use clap::Parser;
use is_terminal::IsTerminal;

use relaychat::cli::Cli;
use relaychat::commands::{self, load_config};
use relaychat::logger;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();

    logger::init_logger(logger::level_for_flags(args.quiet, args.debug));

    let config = load_config(args.config.as_deref())?;
    let color = !args.plain && std::io::stdout().is_terminal();

    let mut stdout = std::io::stdout();
    commands::dispatch(&args.command, config, color, &mut stdout).await
}
