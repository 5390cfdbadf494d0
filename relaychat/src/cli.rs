// relaychat/src/cli.rs
//! This file defines the command-line interface (CLI) for the relaychat application,
//! including all available commands and their arguments.
//! License: MIT OR Apache-2.0

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "relaychat",
    author = "Relay",
    version = env!("CARGO_PKG_VERSION"),
    about = "Run chat messages through the relaychat pipeline",
    long_about = "relaychat censors, mention-annotates and formats chat messages the way a multi-server chat relay would, against an in-memory roster given on the command line. It also previews connection announcements and private messages.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Path to a YAML configuration file. The embedded defaults are used otherwise.
    #[arg(long = "config", value_name = "FILE", env = "RELAYCHAT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Suppress all informational and debug messages.
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG).
    #[arg(long, short = 'd', global = true, conflicts_with = "quiet")]
    pub debug: bool,

    /// Print without ANSI colours.
    #[arg(long, global = true)]
    pub plain: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `relaychat` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Relays a chat message, or every line of stdin, through the pipeline.
    Chat(ChatCommand),

    /// Shows what the profanity filter does to a text.
    Check(CheckCommand),

    /// Completes a partially typed line's trailing @mention.
    Suggest(SuggestCommand),

    /// Formats a connection announcement.
    Event(EventCommand),

    /// Sends a private message between two online participants.
    Whisper(WhisperCommand),
}

#[derive(Parser, Debug)]
pub struct ChatCommand {
    /// Name of the participant sending the message.
    #[arg(long, short = 's')]
    pub sender: String,

    /// Server the sender is on.
    #[arg(long, default_value = "lobby")]
    pub server: String,

    /// Other online participants (comma-separated). The sender is always online.
    #[arg(long, short = 'o', value_delimiter = ',')]
    pub online: Vec<String>,

    /// The message. Reads stdin line by line if omitted.
    pub message: Option<String>,
}

#[derive(Parser, Debug)]
pub struct CheckCommand {
    /// Text to check. Reads stdin if omitted.
    pub text: Option<String>,

    /// Print the matches as JSON instead of the censored text and report.
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct SuggestCommand {
    /// Online participants (comma-separated).
    #[arg(long, short = 'o', value_delimiter = ',')]
    pub online: Vec<String>,

    /// Participant asking for completions; never suggested to themselves.
    #[arg(long = "as", value_name = "NAME")]
    pub requester: Option<String>,

    /// The partially typed line, e.g. "hello @al".
    pub partial: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventKind {
    /// First connection to a server (first join if never seen before).
    Join,
    /// Moving from one server to another.
    Switch,
    /// Leaving the proxy from a server.
    Leave,
    /// Leaving the proxy before reaching any server.
    Disconnect,
}

#[derive(Parser, Debug)]
pub struct EventCommand {
    #[arg(value_enum)]
    pub kind: EventKind,

    #[arg(long, short = 'p')]
    pub player: String,

    /// Server connected to (join, switch) or left from (leave).
    #[arg(long)]
    pub server: Option<String>,

    /// Server switched away from.
    #[arg(long)]
    pub previous: Option<String>,

    /// Directory holding seen_players.txt. Defaults to the user data directory.
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct WhisperCommand {
    #[arg(long, short = 's')]
    pub sender: String,

    /// Name of the recipient.
    #[arg(long)]
    pub to: String,

    /// Other online participants (comma-separated). The sender is always online.
    #[arg(long, short = 'o', value_delimiter = ',')]
    pub online: Vec<String>,

    /// The message words.
    #[arg(trailing_var_arg = true)]
    pub message: Vec<String>,
}
