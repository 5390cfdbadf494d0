// relaychat/src/commands/whisper.rs
//! `relaychat whisper`: sends a private message between two participants.

use anyhow::Result;
use relaychat_core::{PrivateMessenger, PrivateOutcome, ProfanityFilter, RelayConfig};
use std::io::Write;
use std::sync::Arc;

use super::{build_roster, label};
use crate::cli::WhisperCommand;
use crate::ui::render::render_markup;

pub fn run_whisper<W: Write>(cmd: &WhisperCommand, config: RelayConfig, color: bool, out: &mut W) -> Result<()> {
    let (sender, roster) = build_roster(&cmd.sender, &cmd.online);
    let filter = Arc::new(ProfanityFilter::from_config(&config.profanity));
    let messenger = PrivateMessenger::new(config.into_shared(), roster, filter);

    match messenger.send(&sender, &cmd.to, &cmd.message.join(" ")) {
        PrivateOutcome::Rejected(reason) => {
            writeln!(out, "{} {}", label("rejected", color), render_markup(&reason, color))?;
        }
        PrivateOutcome::Delivered {
            recipient,
            to_sender,
            to_recipient,
        } => {
            writeln!(
                out,
                "{} {}",
                label(&format!("to {}", sender.name()), color),
                render_markup(&to_sender, color)
            )?;
            writeln!(
                out,
                "{} {}",
                label(&format!("to {}", recipient.name()), color),
                render_markup(&to_recipient, color)
            )?;
        }
    }
    Ok(())
}
