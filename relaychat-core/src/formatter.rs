// relaychat-core/src/formatter.rs
//! Placeholder expansion for chat templates.
//!
//! A template such as `"<player> <gray>> <reset><message>"` is markup in which
//! some tags name placeholders. Each supplied [`Placeholder`] is substituted in
//! one of two modes:
//!
//! * [`PlaceholderMode::Parsed`] inserts the value verbatim, so any markup in it
//!   is interpreted. Only for operator-authored values.
//! * [`PlaceholderMode::Unparsed`] escapes the value first, so it always renders
//!   as literal text. Required for anything a participant typed.
//!
//! Known placeholder tags with no supplied value are dropped. Every other tag
//! is left for the markup parser.

use std::borrow::Cow;

use crate::markup;

/// Placeholder names that are removed from the output when no value is supplied.
pub const KNOWN_PLACEHOLDERS: &[&str] = &[
    "player",
    "message",
    "server",
    "previous_server",
    "sender",
    "recipient",
    "direction",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderMode {
    Parsed,
    Unparsed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    pub value: String,
    pub mode: PlaceholderMode,
}

impl Placeholder {
    pub fn parsed(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            mode: PlaceholderMode::Parsed,
        }
    }

    pub fn unparsed(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            mode: PlaceholderMode::Unparsed,
        }
    }

    fn rendered(&self) -> Cow<'_, str> {
        match self.mode {
            PlaceholderMode::Parsed => Cow::Borrowed(&self.value),
            PlaceholderMode::Unparsed => Cow::Owned(markup::escape(&self.value)),
        }
    }
}

/// Expands placeholders in `template`. Never fails; unresolved known placeholders vanish.
pub fn format_template(template: &str, placeholders: &[Placeholder]) -> String {
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;

    while let Some(c) = rest.chars().next() {
        if c == '\\' {
            // Keep escape pairs intact so an escaped `\<player>` is never expanded.
            let pair_len = 1 + rest[1..].chars().next().map_or(0, char::len_utf8);
            out.push_str(&rest[..pair_len]);
            rest = &rest[pair_len..];
            continue;
        }

        if c == '<' {
            let after = &rest[1..];
            let close = after.find('>');
            let nested = after.find('<');
            if let Some(end) = close.filter(|end| nested.map_or(true, |n| n > *end)) {
                let name = &after[..end];
                if let Some(p) = placeholders.iter().find(|p| p.name.eq_ignore_ascii_case(name)) {
                    out.push_str(&p.rendered());
                    rest = &after[end + 1..];
                    continue;
                }
                if KNOWN_PLACEHOLDERS.iter().any(|k| k.eq_ignore_ascii_case(name)) {
                    rest = &after[end + 1..];
                    continue;
                }
            }
        }

        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Formats a global chat line. `server` is omitted when the sender is not on one.
pub fn format_chat_message(
    format: &str,
    player_name: &str,
    server_name: Option<&str>,
    message: &str,
    parse_message: bool,
) -> String {
    let mut placeholders = vec![Placeholder::parsed("player", player_name)];
    if let Some(server) = server_name {
        placeholders.push(Placeholder::parsed("server", server));
    }
    placeholders.push(if parse_message {
        Placeholder::parsed("message", message)
    } else {
        Placeholder::unparsed("message", message)
    });
    format_template(format, &placeholders)
}

/// Formats a join, leave, switch or disconnect announcement.
pub fn format_server_message(
    format: &str,
    player_name: &str,
    server_name: Option<&str>,
    previous_server_name: Option<&str>,
) -> String {
    let mut placeholders = vec![Placeholder::parsed("player", player_name)];
    if let Some(server) = server_name {
        placeholders.push(Placeholder::parsed("server", server));
    }
    if let Some(previous) = previous_server_name {
        placeholders.push(Placeholder::parsed("previous_server", previous));
    }
    format_template(format, &placeholders)
}

/// Formats one side of a private message. The message body is always unparsed.
pub fn format_private_message(
    format: &str,
    sender_name: &str,
    recipient_name: &str,
    message: &str,
    is_sender: bool,
) -> String {
    format_template(
        format,
        &[
            Placeholder::parsed("sender", sender_name),
            Placeholder::parsed("recipient", recipient_name),
            Placeholder::unparsed("message", message),
            Placeholder::parsed("direction", if is_sender { "to" } else { "from" }),
        ],
    )
}
