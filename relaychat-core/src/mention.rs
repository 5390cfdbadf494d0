// relaychat-core/src/mention.rs
//! Mention resolution: finds `@name` tokens, resolves them against the live
//! roster, highlights the ones that name another online participant and
//! notifies each of those participants once.
//!
//! The roster is queried at each point of need rather than snapshotted, so a
//! participant leaving mid-message may be resolved for one token and not for
//! the next.

use arc_swap::ArcSwap;
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::MentionConfig;
use crate::formatter::{format_template, Placeholder};
use crate::markup;
use crate::notify::{Notification, Notifier, SoundKey};
use crate::roster::{Identity, Roster};

lazy_static! {
    static ref MENTION_TOKEN: Regex = Regex::new(r"@([A-Za-z0-9_]{3,16})").unwrap();
}

const RESET: &str = "<reset>";

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// An `@name` token found in a message. Offsets are byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionToken {
    /// The token as typed, including `@`.
    pub raw_text: String,
    /// The typed name without `@`.
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// A token that resolved to an online participant other than the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMention {
    pub token: MentionToken,
    pub identity: Identity,
}

/// Finds every mention token, left to right.
///
/// A token is `@` plus 3 to 16 of `[A-Za-z0-9_]`, and must not run on into a
/// further word character.
pub fn scan_tokens(text: &str) -> Vec<MentionToken> {
    MENTION_TOKEN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            if text[whole.end()..].chars().next().is_some_and(is_word_char) {
                return None;
            }
            Some(MentionToken {
                raw_text: whole.as_str().to_string(),
                name: name.as_str().to_string(),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionResult {
    pub processed_text: String,
    /// Every resolved occurrence, duplicates included, in message order.
    pub resolved: Vec<ResolvedMention>,
    /// The distinct participants mentioned.
    pub mentioned: HashSet<Identity>,
}

impl MentionResult {
    fn unchanged(text: &str) -> Self {
        Self {
            processed_text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn has_mentions(&self) -> bool {
        !self.mentioned.is_empty()
    }

    pub fn mention_count(&self) -> usize {
        self.mentioned.len()
    }

    /// Display names of the distinct mentioned participants, in first-mention order.
    pub fn mentioned_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.resolved
            .iter()
            .filter(|r| seen.insert(r.identity.clone()))
            .map(|r| r.identity.name().to_string())
            .collect()
    }
}

pub struct MentionResolver {
    roster: Arc<dyn Roster>,
    notifier: Arc<dyn Notifier>,
    config: ArcSwap<MentionConfig>,
}

impl MentionResolver {
    pub fn new(roster: Arc<dyn Roster>, notifier: Arc<dyn Notifier>, config: MentionConfig) -> Self {
        Self {
            roster,
            notifier,
            config: ArcSwap::from_pointee(config),
        }
    }

    pub fn reload(&self, config: MentionConfig) {
        self.config.store(Arc::new(config));
    }

    pub fn roster(&self) -> &Arc<dyn Roster> {
        &self.roster
    }

    /// Rewrites resolvable mentions without notifying anyone.
    pub fn resolve(&self, text: &str, sender: &Identity) -> MentionResult {
        let config = self.config.load();
        if !config.enable {
            return MentionResult::unchanged(text);
        }

        let mut result = MentionResult::default();
        let mut out = String::with_capacity(text.len() + 16);
        let mut last_end = 0usize;

        for token in scan_tokens(text) {
            out.push_str(&text[last_end..token.start]);
            last_end = token.end;

            match self.roster.find_by_name(&token.name) {
                Some(identity) if &identity != sender => {
                    out.push_str(&config.color);
                    out.push('@');
                    out.push_str(&markup::escape(identity.name()));
                    out.push_str(RESET);
                    result.mentioned.insert(identity.clone());
                    result.resolved.push(ResolvedMention { token, identity });
                }
                _ => out.push_str(&token.raw_text),
            }
        }
        out.push_str(&text[last_end..]);

        result.processed_text = out;
        result
    }

    /// Rewrites mentions and notifies every distinct mentioned participant once.
    pub fn process_mentions(&self, text: &str, sender: &Identity) -> MentionResult {
        let result = self.resolve(text, sender);
        if result.has_mentions() {
            let config = self.config.load();
            let mut notified = HashSet::new();
            for r in &result.resolved {
                if notified.insert(r.identity.clone()) {
                    self.send_notification(&r.identity, sender, &config);
                }
            }
        }
        result
    }

    /// Dispatches one notification. Never fails: errors are logged, and a dispatch
    /// with the configured sound that fails is retried once with the fallback sound.
    fn send_notification(&self, mentioned: &Identity, sender: &Identity, config: &MentionConfig) {
        let player = [Placeholder::unparsed("player", sender.name())];
        let build = |sound: SoundKey| Notification {
            recipient: mentioned.clone(),
            title: format_template(&config.title, &player),
            subtitle: format_template(&config.subtitle, &player),
            sound,
        };

        match SoundKey::parse(&config.sound) {
            Ok(sound) => match self.notifier.notify(build(sound)) {
                Ok(()) => {
                    debug!("Sent mention notification to {}.", mentioned.name());
                    return;
                }
                Err(e) => warn!("Error sending mention notification: {}", e),
            },
            Err(e) => warn!("{}; using the fallback sound.", e),
        }

        if let Err(e) = self.notifier.notify(build(SoundKey::fallback())) {
            warn!("Could not send mention notification with the fallback sound: {}", e);
        }
    }

    /// True if any token names a participant who is currently online.
    pub fn contains_mentions(&self, text: &str) -> bool {
        scan_tokens(text)
            .iter()
            .any(|t| self.roster.find_by_name(&t.name).is_some())
    }

    /// The typed names of tokens that resolve to an online participant.
    pub fn extract_mentioned_names(&self, text: &str) -> HashSet<String> {
        scan_tokens(text)
            .into_iter()
            .filter(|t| self.roster.find_by_name(&t.name).is_some())
            .map(|t| t.name)
            .collect()
    }

    pub fn is_valid_mention(&self, name: &str) -> bool {
        self.roster.find_by_name(name).is_some()
    }

    /// Online participants whose name starts with `prefix`, ignoring case and a leading `@`.
    pub fn suggestions(&self, prefix: &str) -> Vec<Identity> {
        let partial = prefix.strip_prefix('@').unwrap_or(prefix).to_lowercase();
        let mut found: Vec<Identity> = self
            .roster
            .list_online()
            .into_iter()
            .filter(|p| p.name().to_lowercase().starts_with(&partial))
            .collect();
        found.sort_by_key(|p| p.name().to_lowercase());
        found
    }

    /// `@Name` suggestions for an input that starts with `@` and has at least one more character.
    pub fn mention_suggestions(&self, input: &str) -> Vec<String> {
        match input.strip_prefix('@') {
            Some(partial) if !partial.is_empty() => self
                .suggestions(partial)
                .iter()
                .map(|p| format!("@{}", p.name()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Tab completion for the last word of a partially typed line.
    ///
    /// Returns the full line once per matching participant, the requester
    /// excluded, or `None` if the last word is not a mention in progress.
    pub fn complete_last_word(&self, partial_line: &str, requester: &Identity) -> Option<Vec<String>> {
        if !self.config.load().enable || partial_line.starts_with('/') {
            return None;
        }

        let mut words: Vec<&str> = partial_line.split(' ').collect();
        while words.last().is_some_and(|w| w.is_empty()) {
            words.pop();
        }
        let current = *words.last()?;
        let partial_name = current.strip_prefix('@').filter(|p| !p.is_empty())?;
        let head = words[..words.len() - 1].join(" ");

        let completions = self
            .suggestions(partial_name)
            .into_iter()
            .filter(|p| p != requester)
            .map(|p| {
                if head.is_empty() && words.len() == 1 {
                    format!("@{}", p.name())
                } else {
                    format!("{} @{}", head, p.name())
                }
            })
            .collect();
        Some(completions)
    }
}

impl std::fmt::Debug for MentionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MentionResolver")
            .field("config", &self.config.load())
            .finish_non_exhaustive()
    }
}
