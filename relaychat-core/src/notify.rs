// relaychat-core/src/notify.rs
//! Mention notifications and the dispatch capability that delivers them.
//!
//! Dispatch is fire-and-forget: [`ChannelNotifier`] hands notifications to a
//! bounded channel with a non-blocking `try_send`, and a consumer elsewhere
//! delivers them. A full or closed channel is reported as an error, which the
//! mention resolver logs and swallows.

use std::fmt;
use tokio::sync::mpsc;

use crate::config::DEFAULT_MENTION_SOUND;
use crate::errors::RelayError;
use crate::roster::Identity;

const DEFAULT_NAMESPACE: &str = "minecraft";

/// A validated `namespace:value` sound identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SoundKey {
    namespace: String,
    value: String,
}

impl SoundKey {
    /// Parses a sound name, lower-casing it and defaulting the namespace to `minecraft`.
    pub fn parse(raw: &str) -> Result<Self, RelayError> {
        let lowered = raw.trim().to_lowercase();
        let (namespace, value) = match lowered.split_once(':') {
            Some((ns, v)) => (ns.to_string(), v.to_string()),
            None => (DEFAULT_NAMESPACE.to_string(), lowered.clone()),
        };

        if namespace.is_empty() || !namespace.chars().all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-')) {
            return Err(RelayError::InvalidSoundKey(raw.to_string(), "namespace must match [a-z0-9_.-]+"));
        }
        if value.is_empty() || !value.chars().all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-' | '/')) {
            return Err(RelayError::InvalidSoundKey(raw.to_string(), "value must match [a-z0-9_./-]+"));
        }
        Ok(Self { namespace, value })
    }

    /// The fixed sound used when the configured one cannot be used.
    pub fn fallback() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            value: DEFAULT_MENTION_SOUND
                .split_once(':')
                .map_or(DEFAULT_MENTION_SOUND, |(_, v)| v)
                .to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for SoundKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.value)
    }
}

/// An on-screen title/subtitle plus an audio cue for one mentioned participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: Identity,
    /// Markup, already expanded with the sender's name.
    pub title: String,
    pub subtitle: String,
    pub sound: SoundKey,
}

/// Delivers notifications. Must not block the caller.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), RelayError>;
}

/// Queues notifications on a bounded tokio channel without waiting.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<Notification>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::Sender<Notification>) -> Self {
        Self { tx }
    }

    /// Creates a notifier together with the receiving end of its channel.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) -> Result<(), RelayError> {
        let recipient = notification.recipient.name().to_string();
        self.tx
            .try_send(notification)
            .map_err(|e| RelayError::NotificationFailed(recipient, e.to_string()))
    }
}
