// relaychat/src/commands/mod.rs
//! Subcommand implementations and the helpers they share.

pub mod chat;
pub mod check;
pub mod event;
pub mod suggest;
pub mod whisper;

use anyhow::{Context, Result};
use log::debug;
use owo_colors::OwoColorize;
use relaychat_core::roster::names_equal;
use relaychat_core::{Identity, RelayConfig, SharedRoster};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::cli::Commands;

/// Loads the configuration file if one was given, the embedded defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig> {
    match path {
        Some(p) => RelayConfig::load_from_file(p)
            .with_context(|| format!("Failed to load configuration from {}", p.display())),
        None => RelayConfig::load_default(),
    }
}

/// A stable identity derived from a participant name, so repeated runs agree
/// on who has been seen before. Names differing only in case share an identity.
pub fn offline_identity(name: &str) -> Identity {
    let key = format!("OfflinePlayer:{}", name.to_lowercase());
    Identity::with_id(Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()), name)
}

/// Builds a roster from participant names, skipping blanks and case-insensitive duplicates.
pub fn roster_of<'a>(names: impl IntoIterator<Item = &'a str>) -> SharedRoster {
    let roster = SharedRoster::new();
    let mut seen: Vec<&str> = Vec::new();
    for name in names.into_iter().map(str::trim).filter(|n| !n.is_empty()) {
        if !seen.iter().any(|s| names_equal(s, name)) {
            seen.push(name);
            roster.connect(offline_identity(name));
        }
    }
    debug!("Roster has {} online participants.", roster.len());
    roster
}

/// Builds the roster from the sender plus the `--online` names, and returns the sender's identity.
pub fn build_roster(sender: &str, online: &[String]) -> (Identity, Arc<SharedRoster>) {
    let names = std::iter::once(sender).chain(online.iter().map(String::as_str));
    (offline_identity(sender), Arc::new(roster_of(names)))
}

/// A bracketed label, dimmed when colour is on.
pub fn label(text: &str, color: bool) -> String {
    let bracketed = format!("[{}]", text);
    if color {
        bracketed.dimmed().to_string()
    } else {
        bracketed
    }
}

/// Runs the selected subcommand, writing its output to `out`.
pub async fn dispatch<W: Write>(command: &Commands, config: RelayConfig, color: bool, out: &mut W) -> Result<()> {
    match command {
        Commands::Chat(cmd) => chat::run_chat(cmd, config, color, out).await,
        Commands::Check(cmd) => check::run_check(cmd, config, color, out),
        Commands::Suggest(cmd) => suggest::run_suggest(cmd, config, out),
        Commands::Event(cmd) => event::run_event(cmd, config, color, out),
        Commands::Whisper(cmd) => whisper::run_whisper(cmd, config, color, out),
    }
}
