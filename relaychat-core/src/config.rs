//! Configuration management for `relaychat-core`.
//!
//! This module defines the configuration sections consumed by the pipeline,
//! the connection-event formatters and the private messenger. It handles
//! deserialization of YAML configurations and validates the few fields whose
//! mistakes would otherwise only surface mid-conversation.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use arc_swap::ArcSwap;
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::notify::SoundKey;

/// Default notification sound, also used as the fallback when the configured one is invalid.
pub const DEFAULT_MENTION_SOUND: &str = "minecraft:block.note_block.pling";

/// Word rules shipped with the default configuration.
///
/// A leading `*` is not a wildcard: `"*хуй*"` only matches text that contains a literal `*`.
pub const DEFAULT_PROFANITY_WORDS: &[&str] = &[
    "ахуе*", "бля*", "ганд*", "даун*", "дибил*",
    "долбаёб", "долбаоб", "еба*", "ёба*",
    "канцлагер*", "концлагер*", "конча*", "конче*",
    "мраз*", "нахуй", "нига",
    "пидор*", "пидр*", "пизд*",
    "уеб*", "уёб*", "хентай",
    "*хуй*", "*хую*",
    "чечен*", "чмо",
    "nigg*", "fag*", "tranny*", "retard*", "kike*",
    "spic*", "chink*", "gook*", "raghead*", "beaner*",
    "wetback*", "whore*", "bitch*", "slut*", "bastard*",
    "ass*", "dick*", "cock*", "piss*", "cum*",
    "kill yourself", "kys", "killurself",
    "suicide*", "suicidal*",
];

/// Settings for the global chat relay.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChatConfig {
    pub enable: bool,
    /// Emit one `info` line per relayed message.
    pub log_to_console: bool,
    /// If true the original delivery is cancelled and the formatted message goes to everyone.
    /// Otherwise the original delivery stays and the formatted copy goes to every other server.
    pub passthrough: bool,
    /// Interpret markup typed by participants. Leave off unless every participant is trusted.
    pub parse_player_messages: bool,
    pub format: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enable: true,
            log_to_console: true,
            passthrough: true,
            parse_player_messages: false,
            format: "<player> <gray>> <reset><message>".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GlobalChatConfig {
    /// Leading character that is stripped with a warning. Empty disables the check.
    pub soft_prefix: String,
    pub warning_message: String,
}

impl Default for GlobalChatConfig {
    fn default() -> Self {
        Self {
            soft_prefix: "!".to_string(),
            warning_message: "<yellow>Chat is global already, the <gold>!</gold> prefix is not needed.".to_string(),
        }
    }
}

impl GlobalChatConfig {
    pub fn soft_prefix_char(&self) -> Option<char> {
        self.soft_prefix.chars().next()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UrlConfig {
    pub clickable: bool,
    pub pattern: String,
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            clickable: true,
            pattern: r"https?://\S+".to_string(),
        }
    }
}

/// A join/leave/switch/disconnect announcement.
///
/// `passthrough` is ignored by the switch and disconnect events.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerEventConfig {
    pub enable: bool,
    pub passthrough: bool,
    pub format: String,
}

impl Default for ServerEventConfig {
    fn default() -> Self {
        Self {
            enable: true,
            passthrough: true,
            format: "<gray><player>".to_string(),
        }
    }
}

impl ServerEventConfig {
    fn with_format(format: &str) -> Self {
        Self {
            format: format.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MentionConfig {
    pub enable: bool,
    /// Markup placed before a highlighted mention, e.g. `<gold>`.
    pub color: String,
    pub sound: String,
    pub title: String,
    pub subtitle: String,
}

impl Default for MentionConfig {
    fn default() -> Self {
        Self {
            enable: true,
            color: "<gold>".to_string(),
            sound: DEFAULT_MENTION_SOUND.to_string(),
            title: "<gold>Mention".to_string(),
            subtitle: "<yellow><player> mentioned you".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PrivateMessageConfig {
    pub enable: bool,
    pub log_to_console: bool,
    pub sender_format: String,
    pub recipient_format: String,
    pub console_log_format: String,
    pub disabled_message: String,
    pub player_not_found: String,
    pub self_message: String,
    pub usage_message: String,
}

impl Default for PrivateMessageConfig {
    fn default() -> Self {
        Self {
            enable: true,
            log_to_console: true,
            sender_format: "<gray>[<gold>You<gray> -> <green><recipient><gray>]: <reset><message>".to_string(),
            recipient_format: "<gray>[<green><sender><gray> -> <gold>You<gray>]: <reset><message>".to_string(),
            console_log_format: "[PRIVATE] <sender> > <recipient>: <message>".to_string(),
            disabled_message: "<red>Private messages are disabled.".to_string(),
            player_not_found: "<red>Player <player> is not online.".to_string(),
            self_message: "<red>You cannot message yourself.".to_string(),
            usage_message: "<red>Usage: /msg <player> <message>".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProfanityConfig {
    pub enable: bool,
    /// Character used to mask every censored character.
    pub mask: char,
    /// Ordered word rules. A trailing `*` accepts any letter continuation.
    pub words: Vec<String>,
}

impl Default for ProfanityConfig {
    fn default() -> Self {
        Self {
            enable: true,
            mask: '*',
            words: DEFAULT_PROFANITY_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

fn default_join() -> ServerEventConfig {
    ServerEventConfig::with_format("<gray>[<green>+<gray>] <green><player>")
}

fn default_first_join() -> ServerEventConfig {
    ServerEventConfig::with_format("<gray>[<red>!<gray>] <green><player> <gray>joined for the first time")
}

fn default_leave() -> ServerEventConfig {
    ServerEventConfig::with_format("<gray>[<red>-<gray>] <red><player>")
}

fn default_switch() -> ServerEventConfig {
    ServerEventConfig::with_format(
        "<gray>[<aqua>~<gray>] <aqua><player></aqua>: <yellow><previous_server> <gray>-> <aqua><server>",
    )
}

fn default_disconnect() -> ServerEventConfig {
    ServerEventConfig::with_format("<gray>[<red>-<gray>] <yellow><player>")
}

/// One configuration generation shared by the pipeline, event formatter and
/// private messenger. Reload stores a new generation; readers load once per call.
pub type SharedConfig = Arc<ArcSwap<RelayConfig>>;

/// Represents the top-level configuration structure for relaychat.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub global_chat: GlobalChatConfig,
    #[serde(default)]
    pub urls: UrlConfig,
    #[serde(default = "default_join")]
    pub join: ServerEventConfig,
    #[serde(default = "default_first_join")]
    pub first_join: ServerEventConfig,
    #[serde(default = "default_leave")]
    pub leave: ServerEventConfig,
    #[serde(default = "default_switch")]
    pub switch: ServerEventConfig,
    #[serde(default = "default_disconnect")]
    pub disconnect: ServerEventConfig,
    #[serde(default)]
    pub mentions: MentionConfig,
    #[serde(default)]
    pub private_messages: PrivateMessageConfig,
    #[serde(default)]
    pub profanity: ProfanityConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            chat: ChatConfig::default(),
            global_chat: GlobalChatConfig::default(),
            urls: UrlConfig::default(),
            join: default_join(),
            first_join: default_first_join(),
            leave: default_leave(),
            switch: default_switch(),
            disconnect: default_disconnect(),
            mentions: MentionConfig::default(),
            private_messages: PrivateMessageConfig::default(),
            profanity: ProfanityConfig::default(),
        }
    }
}

impl RelayConfig {
    pub fn into_shared(self) -> SharedConfig {
        Arc::new(ArcSwap::from_pointee(self))
    }

    /// Loads a configuration from a YAML file. Missing sections take their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&text)
            .with_context(|| format!("Failed to load config file {}", path.display()))?;
        info!(
            "Loaded configuration with {} profanity words from {}.",
            config.profanity.words.len(),
            path.display()
        );
        Ok(config)
    }

    /// Loads the embedded default configuration.
    pub fn load_default() -> Result<Self> {
        debug!("Loading default configuration from embedded string...");
        let default_yaml = include_str!("../config/default_config.yaml");
        Self::from_yaml(default_yaml).context("Failed to parse default configuration")
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: RelayConfig = serde_yml::from_str(text).context("Failed to parse YAML")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the fields that would otherwise fail silently at message time.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.global_chat.soft_prefix.chars().count() > 1 {
            errors.push(format!(
                "global_chat.soft_prefix must be a single character, got '{}'.",
                self.global_chat.soft_prefix
            ));
        }

        if self.urls.clickable {
            if let Err(e) = Regex::new(&self.urls.pattern) {
                errors.push(format!("urls.pattern is not a valid regex: {}", e));
            }
        }

        if let Err(e) = SoundKey::parse(&self.mentions.sound) {
            warn!("mentions.sound is invalid ({}); '{}' will be used instead.", e, DEFAULT_MENTION_SOUND);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("Configuration validation failed:\n{}", errors.join("\n")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_match_struct_defaults() {
        let embedded = RelayConfig::load_default().unwrap();
        assert_eq!(embedded, RelayConfig::default());
    }

    #[test]
    fn default_word_list_is_shipped() {
        let config = RelayConfig::default();
        assert_eq!(config.profanity.words.len(), 51);
        assert_eq!(config.profanity.words.first().map(String::as_str), Some("ахуе*"));
        assert!(config.profanity.words.iter().any(|w| w == "kill yourself"));
    }

    #[test]
    fn partial_yaml_keeps_section_defaults() {
        let config = RelayConfig::from_yaml(
            r#"
chat:
  passthrough: false
profanity:
  words: ["бля*", "хуй"]
"#,
        )
        .unwrap();
        assert!(!config.chat.passthrough);
        assert!(config.chat.enable);
        assert_eq!(config.profanity.words.len(), 2);
        assert_eq!(config.switch, default_switch());
        assert_eq!(config.profanity.mask, '*');
    }

    #[test]
    fn rejects_multi_char_soft_prefix() {
        let err = RelayConfig::from_yaml("global_chat:\n  soft_prefix: \"!!\"\n").unwrap_err();
        assert!(format!("{:#}", err).contains("soft_prefix"));
    }

    #[test]
    fn rejects_invalid_url_pattern() {
        let err = RelayConfig::from_yaml("urls:\n  pattern: \"(unclosed\"\n").unwrap_err();
        assert!(format!("{:#}", err).contains("urls.pattern"));
    }

    #[test]
    fn invalid_sound_is_only_a_warning() {
        let config = RelayConfig::from_yaml("mentions:\n  sound: \"Not A Key!\"\n").unwrap();
        assert_eq!(config.mentions.sound, "Not A Key!");
    }
}
