// relaychat/src/commands/chat.rs
//! `relaychat chat`: relays messages through the chat pipeline.

use anyhow::{Context, Result};
use log::info;
use relaychat_core::{
    ChannelNotifier, ChatOutcome, ChatPipeline, ChatRoute, Identity, Notification, RelayConfig, SuppressReason,
};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::Receiver;

use super::{build_roster, label};
use crate::cli::ChatCommand;
use crate::ui::render::{links, render_markup};

const NOTIFICATION_CAPACITY: usize = 64;

pub async fn run_chat<W: Write>(cmd: &ChatCommand, config: RelayConfig, color: bool, out: &mut W) -> Result<()> {
    let (sender, roster) = build_roster(&cmd.sender, &cmd.online);
    let (notifier, mut rx) = ChannelNotifier::channel(NOTIFICATION_CAPACITY);
    let pipeline =
        ChatPipeline::new(config, roster, Arc::new(notifier)).context("Failed to build the chat pipeline")?;

    if let Some(message) = &cmd.message {
        return relay_one(&pipeline, &sender, &cmd.server, message, &mut rx, color, out);
    }

    info!("Reading chat lines from stdin.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        relay_one(&pipeline, &sender, &cmd.server, &line, &mut rx, color, out)?;
    }
    Ok(())
}

fn relay_one<W: Write>(
    pipeline: &ChatPipeline,
    sender: &Identity,
    server: &str,
    text: &str,
    rx: &mut Receiver<Notification>,
    color: bool,
    out: &mut W,
) -> Result<()> {
    let outcome = pipeline.process(sender, Some(server), text);

    if let Some(warning) = outcome.warning() {
        writeln!(out, "{} {}", label("warning", color), render_markup(warning, color))?;
    }

    match &outcome {
        ChatOutcome::Ignored => writeln!(out, "{} chat is disabled", label("ignored", color))?,
        ChatOutcome::Suppressed { reason, .. } => {
            let why = match reason {
                SuppressReason::EmptyMessage => "empty message",
            };
            writeln!(out, "{} {}", label("suppressed", color), why)?;
        }
        ChatOutcome::Broadcast(broadcast) => {
            let route = match &broadcast.route {
                ChatRoute::BroadcastAll => "all".to_string(),
                ChatRoute::RelayToOthers { origin } => format!("others, original on {}", origin),
            };
            writeln!(out, "{} {}", label(&route, color), render_markup(&broadcast.formatted, color))?;
            for url in links(&broadcast.formatted) {
                writeln!(out, "{} {}", label("link", color), url)?;
            }
        }
    }

    // Notifications are queued during `process`; show them with the message that caused them.
    while let Ok(notification) = rx.try_recv() {
        writeln!(
            out,
            "{} {}: {} | {} ({})",
            label("notify", color),
            notification.recipient.name(),
            render_markup(&notification.title, color),
            render_markup(&notification.subtitle, color),
            notification.sound
        )?;
    }
    out.flush()?;
    Ok(())
}
