// relaychat/src/commands/event.rs
//! `relaychat event`: previews a connection announcement.

use anyhow::{anyhow, bail, Context, Result};
use log::debug;
use relaychat_core::{EventBroadcast, EventFormatter, EventRoute, FileSeenStore, RelayConfig};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use super::{label, offline_identity};
use crate::cli::{EventCommand, EventKind};
use crate::ui::render::render_markup;

fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|d| d.join("relaychat"))
        .ok_or_else(|| anyhow!("Could not determine a data directory; pass --data-dir"))
}

fn require<'a>(value: &'a Option<String>, flag: &str, kind: EventKind) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => bail!("--{} is required for a {:?} event", flag, kind),
    }
}

pub fn run_event<W: Write>(cmd: &EventCommand, config: RelayConfig, color: bool, out: &mut W) -> Result<()> {
    let data_dir = match &cmd.data_dir {
        Some(dir) => dir.clone(),
        None => default_data_dir()?,
    };
    debug!("Using data directory {}", data_dir.display());

    let store = FileSeenStore::open(&data_dir).context("Failed to open the seen-players store")?;
    let events = EventFormatter::new(config.into_shared(), Arc::new(store));
    let player = offline_identity(&cmd.player);

    let broadcast = match cmd.kind {
        EventKind::Join => events.on_server_connected(&player, require(&cmd.server, "server", cmd.kind)?, None),
        EventKind::Switch => events.on_server_connected(
            &player,
            require(&cmd.server, "server", cmd.kind)?,
            Some(require(&cmd.previous, "previous", cmd.kind)?),
        ),
        EventKind::Leave => events.on_disconnect(&player, Some(require(&cmd.server, "server", cmd.kind)?)),
        EventKind::Disconnect => events.on_disconnect(&player, None),
    };

    print_broadcast(broadcast, color, out)
}

fn print_broadcast<W: Write>(broadcast: Option<EventBroadcast>, color: bool, out: &mut W) -> Result<()> {
    match broadcast {
        Some(EventBroadcast { formatted, route }) => {
            let route = match route {
                EventRoute::Everyone => "everyone".to_string(),
                EventRoute::Server(name) => format!("server {}", name),
            };
            writeln!(out, "{} {}", label(&route, color), render_markup(&formatted, color))?;
        }
        None => writeln!(out, "{} announcement disabled", label("silent", color))?,
    }
    Ok(())
}
