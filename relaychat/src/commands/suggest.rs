// relaychat/src/commands/suggest.rs
//! `relaychat suggest`: tab completion for a trailing `@mention`.

use anyhow::Result;
use relaychat_core::{ChannelNotifier, Identity, MentionResolver, RelayConfig};
use std::io::Write;
use std::sync::Arc;

use super::{build_roster, roster_of};
use crate::cli::SuggestCommand;

pub fn run_suggest<W: Write>(cmd: &SuggestCommand, config: RelayConfig, out: &mut W) -> Result<()> {
    let (requester, roster) = match &cmd.requester {
        Some(name) => build_roster(name, &cmd.online),
        // A requester outside the roster excludes nobody.
        None => (
            Identity::new("console"),
            Arc::new(roster_of(cmd.online.iter().map(String::as_str))),
        ),
    };

    let (notifier, _rx) = ChannelNotifier::channel(1);
    let resolver = MentionResolver::new(roster, Arc::new(notifier), config.mentions);

    if let Some(completions) = resolver.complete_last_word(&cmd.partial, &requester) {
        for line in completions {
            writeln!(out, "{}", line)?;
        }
    }
    Ok(())
}
