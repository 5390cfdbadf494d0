// relaychat/src/commands/check.rs
//! `relaychat check`: shows how the configured word list treats a text.

use anyhow::{Context, Result};
use log::warn;
use owo_colors::OwoColorize;
use relaychat_core::{ProfanityFilter, RelayConfig};
use std::io::{self, Read, Write};

use super::label;
use crate::cli::CheckCommand;

pub fn run_check<W: Write>(cmd: &CheckCommand, config: RelayConfig, color: bool, out: &mut W) -> Result<()> {
    let text = match &cmd.text {
        Some(t) => t.clone(),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("Failed to read from stdin")?;
            buf.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if !config.profanity.enable {
        warn!("Profanity filtering is disabled in the configuration; checking against the word list anyway.");
    }
    let filter = ProfanityFilter::from_config(&config.profanity);

    if cmd.json {
        let matches = filter.find_matches(&text);
        let json = serde_json::to_string_pretty(&matches).context("Failed to serialize matches")?;
        writeln!(out, "{}", json)?;
        return Ok(());
    }

    let censored = filter.censor(&text);
    let shown = if color && censored != text {
        censored.red().to_string()
    } else {
        censored
    };
    writeln!(out, "{} {}", label("censored", color), shown)?;
    write!(out, "{}", filter.debug_report(&text))?;
    Ok(())
}
