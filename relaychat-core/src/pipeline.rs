// relaychat-core/src/pipeline.rs
//! The chat pipeline: one raw message in, one delivery decision out.
//!
//! Stages run in a fixed order and stop at the first suppression:
//!
//! 1. strip the soft prefix and attach the sender warning,
//! 2. suppress empty messages,
//! 3. censor profanity,
//! 4. resolve mentions and notify the mentioned participants,
//! 5. expand the chat template,
//! 6. auto-link URLs,
//! 7. pick the route.
//!
//! Each call loads the configuration once and uses that generation throughout,
//! so [`ChatPipeline::reload`] never affects a message already in flight.

use arc_swap::ArcSwapOption;
use log::{debug, info};
use std::sync::Arc;

use crate::config::{RelayConfig, SharedConfig};
use crate::errors::RelayError;
use crate::formatter::format_chat_message;
use crate::links::LinkRewriter;
use crate::markup;
use crate::mention::MentionResolver;
use crate::notify::Notifier;
use crate::profanity::filter::ProfanityFilter;
use crate::roster::{Identity, Roster};

/// How the host should deliver a relayed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRoute {
    /// Cancel the original delivery and send the formatted message to everyone.
    BroadcastAll,
    /// Keep the original delivery on `origin` and send the formatted copy to every other server.
    RelayToOthers { origin: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    EmptyMessage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatBroadcast {
    /// Formatted markup, ready for [`markup::parse`].
    pub formatted: String,
    pub route: ChatRoute,
    /// Distinct mentioned participants, in first-mention order. Each was notified once.
    pub notified: Vec<Identity>,
    /// Markup to show the sender only.
    pub warning: Option<String>,
    pub censored: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// The pipeline does not handle this message; the host delivers it untouched.
    Ignored,
    /// Nothing is delivered. The warning, if any, still goes to the sender.
    Suppressed {
        reason: SuppressReason,
        warning: Option<String>,
    },
    Broadcast(ChatBroadcast),
}

impl ChatOutcome {
    pub fn broadcast(&self) -> Option<&ChatBroadcast> {
        match self {
            ChatOutcome::Broadcast(b) => Some(b),
            _ => None,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            ChatOutcome::Suppressed { warning, .. } => warning.as_deref(),
            ChatOutcome::Broadcast(b) => b.warning.as_deref(),
            ChatOutcome::Ignored => None,
        }
    }
}

pub struct ChatPipeline {
    config: SharedConfig,
    filter: Arc<ProfanityFilter>,
    mentions: MentionResolver,
    links: ArcSwapOption<LinkRewriter>,
}

impl ChatPipeline {
    pub fn new(config: RelayConfig, roster: Arc<dyn Roster>, notifier: Arc<dyn Notifier>) -> Result<Self, RelayError> {
        Self::with_shared(config.into_shared(), Arc::new(ProfanityFilter::new()), roster, notifier)
    }

    /// Builds a pipeline over a configuration and filter that other components also hold.
    pub fn with_shared(
        config: SharedConfig,
        filter: Arc<ProfanityFilter>,
        roster: Arc<dyn Roster>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, RelayError> {
        let current = config.load_full();
        let pipeline = Self {
            mentions: MentionResolver::new(roster, notifier, current.mentions.clone()),
            config,
            filter,
            links: ArcSwapOption::empty(),
        };
        pipeline.install(&current)?;
        Ok(pipeline)
    }

    pub fn config(&self) -> Arc<RelayConfig> {
        self.config.load_full()
    }

    pub fn shared_config(&self) -> SharedConfig {
        Arc::clone(&self.config)
    }

    pub fn filter(&self) -> &Arc<ProfanityFilter> {
        &self.filter
    }

    pub fn mentions(&self) -> &MentionResolver {
        &self.mentions
    }

    /// Swaps in a new configuration and recompiles what depends on it.
    ///
    /// On error nothing is replaced. The profanity rules are only recompiled
    /// while profanity filtering is enabled; otherwise the previous set is kept.
    ///
    /// The rule set, mention config and link rewriter are swapped first and the
    /// configuration last, each swap atomic on its own. A `process` call racing
    /// a reload can therefore pair the new rules with the old configuration for
    /// that one message; every component it reads is still a single generation.
    pub fn reload(&self, config: RelayConfig) -> Result<(), RelayError> {
        self.install(&config)?;
        self.config.store(Arc::new(config));
        info!("Chat pipeline configuration reloaded.");
        Ok(())
    }

    fn install(&self, config: &RelayConfig) -> Result<(), RelayError> {
        let links = if config.urls.clickable {
            Some(Arc::new(LinkRewriter::new(&config.urls.pattern)?))
        } else {
            None
        };
        if config.profanity.enable {
            self.filter.reload(&config.profanity);
        }
        self.mentions.reload(config.mentions.clone());
        self.links.store(links);
        Ok(())
    }

    /// Runs one message through every stage.
    ///
    /// `server` is the sender's current server; a sender on no server is ignored.
    pub fn process(&self, sender: &Identity, server: Option<&str>, raw: &str) -> ChatOutcome {
        let config = self.config.load_full();

        if !config.chat.enable {
            debug!("Chat is disabled, skipping message processing");
            return ChatOutcome::Ignored;
        }
        let Some(server) = server else {
            debug!("Player not connected to any server, skipping");
            return ChatOutcome::Ignored;
        };

        debug!("Processing chat message from {}", sender.name());

        let mut message = raw;
        let mut warning = None;
        if let Some(prefix) = config.global_chat.soft_prefix_char() {
            if let Some(rest) = message.strip_prefix(prefix) {
                message = rest.trim();
                warning = Some(config.global_chat.warning_message.clone());
            }
        }

        if message.trim().is_empty() {
            return ChatOutcome::Suppressed {
                reason: SuppressReason::EmptyMessage,
                warning,
            };
        }

        let filtered = if config.profanity.enable {
            self.filter.censor(message)
        } else {
            message.to_string()
        };
        let censored = filtered != message;
        if censored {
            debug!("Profanity filtered for {}", sender.name());
        }

        // Without parsing, participant text is escaped up front so only the
        // mention highlights spliced in below are interpreted.
        let parse_message = config.chat.parse_player_messages;
        let mention_input = if parse_message {
            filtered.clone()
        } else {
            markup::escape(&filtered)
        };
        let mention_result = self.mentions.process_mentions(&mention_input, sender);
        let mentioned_names = mention_result.mentioned_names();
        if mention_result.has_mentions() {
            debug!(
                "Processed {} mentions for {}: {:?}",
                mention_result.mention_count(),
                sender.name(),
                mentioned_names
            );
        }

        let mut formatted = format_chat_message(
            &config.chat.format,
            sender.name(),
            Some(server),
            &mention_result.processed_text,
            true,
        );

        if let Some(links) = self.links.load().as_ref() {
            formatted = links.rewrite(&formatted);
        }

        let route = if config.chat.passthrough {
            ChatRoute::BroadcastAll
        } else {
            ChatRoute::RelayToOthers {
                origin: server.to_string(),
            }
        };

        if config.chat.log_to_console {
            let mut line = format!("GLOBAL: <{}@{}> {}", sender.name(), server, filtered);
            if mention_result.has_mentions() {
                line.push_str(&format!(
                    " [Mentions: {} players: [{}]]",
                    mention_result.mention_count(),
                    mentioned_names.join(", ")
                ));
            }
            if warning.is_some() {
                line.push_str(" [Had ! prefix]");
            }
            if censored {
                line.push_str(" [Profanity filtered]");
            }
            info!("{}", line);
        }

        let mut seen = std::collections::HashSet::new();
        let notified = mention_result
            .resolved
            .into_iter()
            .map(|r| r.identity)
            .filter(|id| seen.insert(id.clone()))
            .collect();

        ChatOutcome::Broadcast(ChatBroadcast {
            formatted,
            route,
            notified,
            warning,
            censored,
        })
    }
}

impl std::fmt::Debug for ChatPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatPipeline")
            .field("rules", &self.filter.rule_count())
            .field("mentions", &self.mentions)
            .finish_non_exhaustive()
    }
}
