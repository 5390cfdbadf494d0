// relaychat-core/src/events.rs
//! Connection announcements and private messages.
//!
//! Both produce formatted markup plus a delivery decision and leave the actual
//! delivery to the host.

use log::{debug, info};
use std::sync::Arc;

use crate::config::{RelayConfig, ServerEventConfig, SharedConfig};
use crate::formatter::{format_private_message, format_server_message, format_template, Placeholder};
use crate::markup;
use crate::profanity::filter::ProfanityFilter;
use crate::roster::{Identity, Roster};
use crate::storage::SeenStore;

/// Who receives a connection announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRoute {
    Everyone,
    /// Only participants on the named server.
    Server(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBroadcast {
    pub formatted: String,
    pub route: EventRoute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    FirstJoin,
    Join,
    Switch,
    Leave,
    Disconnect,
}

pub struct EventFormatter {
    config: SharedConfig,
    seen: Arc<dyn SeenStore>,
}

impl EventFormatter {
    pub fn new(config: SharedConfig, seen: Arc<dyn SeenStore>) -> Self {
        Self { config, seen }
    }

    /// Classifies a connection the way [`Self::on_server_connected`] would, without side effects.
    pub fn classify_connect(&self, player: &Identity, previous_server: Option<&str>) -> ConnectionKind {
        let config = self.config.load();
        match previous_server {
            None if config.first_join.enable && !self.seen.has_been_seen(player) => ConnectionKind::FirstJoin,
            None => ConnectionKind::Join,
            Some(_) => ConnectionKind::Switch,
        }
    }

    /// A participant finished connecting to `server`, coming from `previous_server` if switching.
    pub fn on_server_connected(
        &self,
        player: &Identity,
        server: &str,
        previous_server: Option<&str>,
    ) -> Option<EventBroadcast> {
        let config = self.config.load();

        match self.classify_connect(player, previous_server) {
            ConnectionKind::FirstJoin => {
                let broadcast = announce(&config.first_join, config.first_join.passthrough, player, Some(server), None, server);
                self.seen.mark_seen(player);
                info!("{} joined for the first time on {}.", player.name(), server);
                broadcast
            }
            ConnectionKind::Join => announce(&config.join, config.join.passthrough, player, Some(server), None, server),
            // Switches follow the join routing setting.
            _ => announce(&config.switch, config.join.passthrough, player, Some(server), previous_server, server),
        }
    }

    /// A participant left the proxy. `current_server` is `None` if they never reached a server.
    pub fn on_disconnect(&self, player: &Identity, current_server: Option<&str>) -> Option<EventBroadcast> {
        let config = self.config.load();
        match current_server {
            None => {
                if !config.disconnect.enable {
                    return None;
                }
                Some(EventBroadcast {
                    formatted: format_server_message(&config.disconnect.format, player.name(), None, None),
                    route: EventRoute::Everyone,
                })
            }
            Some(server) => announce(&config.leave, config.leave.passthrough, player, Some(server), None, server),
        }
    }
}

fn announce(
    event: &ServerEventConfig,
    passthrough: bool,
    player: &Identity,
    server: Option<&str>,
    previous_server: Option<&str>,
    home: &str,
) -> Option<EventBroadcast> {
    if !event.enable {
        return None;
    }
    let formatted = format_server_message(&event.format, player.name(), server, previous_server);
    let route = if passthrough {
        EventRoute::Everyone
    } else {
        EventRoute::Server(home.to_string())
    };
    Some(EventBroadcast { formatted, route })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivateOutcome {
    /// Nothing was sent; the markup is shown to the sender only.
    Rejected(String),
    Delivered {
        recipient: Identity,
        to_sender: String,
        to_recipient: String,
    },
}

pub struct PrivateMessenger {
    config: SharedConfig,
    roster: Arc<dyn Roster>,
    filter: Arc<ProfanityFilter>,
}

impl PrivateMessenger {
    pub fn new(config: SharedConfig, roster: Arc<dyn Roster>, filter: Arc<ProfanityFilter>) -> Self {
        Self { config, roster, filter }
    }

    pub fn send(&self, sender: &Identity, target_name: &str, text: &str) -> PrivateOutcome {
        let config = self.config.load();
        let pm = &config.private_messages;

        if !pm.enable {
            return PrivateOutcome::Rejected(pm.disabled_message.clone());
        }
        if target_name.trim().is_empty() || text.trim().is_empty() {
            return PrivateOutcome::Rejected(pm.usage_message.clone());
        }

        let Some(recipient) = self.roster.find_by_name(target_name) else {
            return PrivateOutcome::Rejected(format_template(
                &pm.player_not_found,
                &[Placeholder::unparsed("player", target_name)],
            ));
        };
        if &recipient == sender {
            return PrivateOutcome::Rejected(pm.self_message.clone());
        }

        let message = self.censor(&config, text);
        let to_sender = format_private_message(&pm.sender_format, sender.name(), recipient.name(), &message, true);
        let to_recipient =
            format_private_message(&pm.recipient_format, sender.name(), recipient.name(), &message, false);

        if pm.log_to_console {
            let line = format_private_message(&pm.console_log_format, sender.name(), recipient.name(), &message, true);
            info!("{}", markup::parse(&line).plain_text());
        }
        debug!("Delivered private message from {} to {}.", sender.name(), recipient.name());

        PrivateOutcome::Delivered {
            recipient,
            to_sender,
            to_recipient,
        }
    }

    fn censor(&self, config: &RelayConfig, text: &str) -> String {
        if config.profanity.enable {
            self.filter.censor(text)
        } else {
            text.to_string()
        }
    }

    /// Online names starting with `partial`, for completing the target argument.
    pub fn suggest_targets(&self, partial: &str) -> Vec<String> {
        let partial = partial.to_lowercase();
        let mut names: Vec<String> = self
            .roster
            .list_online()
            .into_iter()
            .map(|p| p.name().to_string())
            .filter(|name| name.to_lowercase().starts_with(&partial))
            .collect();
        names.sort_by_key(|n| n.to_lowercase());
        names
    }
}
