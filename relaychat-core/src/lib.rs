// relaychat-core/src/lib.rs
//! # relaychat Core Library
//!
//! `relaychat-core` turns a raw message typed by a participant in a
//! multi-server chat relay into censored, mention-annotated, template-formatted
//! markup that is safe to broadcast, together with the notifications owed to
//! the participants it mentions.
//!
//! The library does no delivery of its own. Hosts supply a [`Roster`] of
//! connected participants and a [`Notifier`], and act on the returned
//! [`ChatOutcome`].
//!
//! ## Modules
//!
//! * `config`: `RelayConfig` and its sections, loaded from YAML.
//! * `profanity`: compiles word rules into fuzzy matchers and applies them.
//! * `profanity_match`: match records and redacted debug logging.
//! * `mention`: `@name` token scanning and resolution against the roster.
//! * `formatter`: parsed/unparsed placeholder expansion.
//! * `markup`: escaping and parsing of the tag markup templates are written in.
//! * `links`: URL auto-linking over formatted markup.
//! * `notify`: notifications, sound keys and the dispatch trait.
//! * `roster`: participant identities and the live roster.
//! * `storage`: the persisted set of participants seen before.
//! * `events`: connection announcements and private messages.
//! * `pipeline`: the ordered chat pipeline that composes all of the above.
//!
//! ## Usage Example
//!
//! ```rust
//! use relaychat_core::{ChannelNotifier, ChatPipeline, Identity, RelayConfig, SharedRoster};
//! use std::sync::Arc;
//!
//! fn main() -> anyhow::Result<()> {
//!     let steve = Identity::new("Steve");
//!     let roster = Arc::new(SharedRoster::from_identities([steve.clone(), Identity::new("Alex")]));
//!     let (notifier, mut rx) = ChannelNotifier::channel(16);
//!
//!     let pipeline = ChatPipeline::new(RelayConfig::load_default()?, roster, Arc::new(notifier))?;
//!     let outcome = pipeline.process(&steve, Some("lobby"), "hi @alex");
//!
//!     let broadcast = outcome.broadcast().expect("message is relayed");
//!     assert_eq!(broadcast.notified[0].name(), "Alex");
//!     assert_eq!(rx.try_recv()?.recipient.name(), "Alex");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Operations that touch files return `anyhow::Result` with context. Pure
//! components either cannot fail or return [`RelayError`]. Failures inside a
//! pipeline run (a pattern that will not compile, a notification that cannot
//! be queued) are logged and degraded around, never surfaced to the sender.
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod config;
pub mod errors;
pub mod events;
pub mod formatter;
pub mod links;
pub mod markup;
pub mod mention;
pub mod notify;
pub mod pipeline;
pub mod profanity;
pub mod profanity_match;
pub mod roster;
pub mod storage;

/// Re-exports the configuration types.
pub use config::{RelayConfig, SharedConfig, DEFAULT_MENTION_SOUND, DEFAULT_PROFANITY_WORDS};

pub use errors::RelayError;

pub use events::{EventBroadcast, EventFormatter, EventRoute, PrivateMessenger, PrivateOutcome};

pub use formatter::{format_template, Placeholder, PlaceholderMode};

pub use markup::{Component, Span, Style, TextColor};

pub use mention::{MentionResolver, MentionResult};

pub use notify::{ChannelNotifier, Notification, Notifier, SoundKey};

/// Re-exports the pipeline entry point and its outcome types.
pub use pipeline::{ChatBroadcast, ChatOutcome, ChatPipeline, ChatRoute, SuppressReason};

pub use profanity::compiler::{CompiledRule, PatternCompiler, RuleSet};
pub use profanity::filter::ProfanityFilter;
pub use profanity_match::ProfanityMatch;

pub use roster::{Identity, Roster, SharedRoster};

pub use storage::{FileSeenStore, MemorySeenStore, SeenStore};
