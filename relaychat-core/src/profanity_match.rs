// relaychat-core/src/profanity_match.rs
//! Data structures for reporting profanity matches, and the debug-logging
//! helpers that keep matched words out of logs unless explicitly allowed.

use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Determines once whether matched words may appear verbatim in debug logs.
    static ref DEBUG_PROFANITY_ALLOWED: bool = {
        std::env::var("RELAYCHAT_ALLOW_DEBUG_PROFANITY")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// A single matched span. Offsets are byte offsets into the scanned text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfanityMatch {
    /// Position of the producing rule among the compiled rules.
    pub rule_index: usize,
    /// The configured word, including any trailing `*`.
    pub rule_word: String,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

pub fn redact_for_log(s: &str) -> String {
    const MAX_LEN: usize = 8;
    let len = s.chars().count();
    if len <= MAX_LEN {
        "[CENSORED]".to_string()
    } else {
        format!("[CENSORED: {} chars]", len)
    }
}

fn get_loggable_content(matched: &str) -> String {
    if *DEBUG_PROFANITY_ALLOWED {
        matched.to_string()
    } else {
        redact_for_log(matched)
    }
}

pub fn log_censor_debug(rule_word: &str, matched: &str, width: usize) {
    debug!(
        "Filtered profanity for rule '{}': '{}' -> {} mask chars",
        get_loggable_content(rule_word),
        get_loggable_content(matched),
        width
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_short_word() {
        assert_eq!(redact_for_log("бля"), "[CENSORED]");
    }

    #[test]
    fn redact_counts_characters_not_bytes() {
        assert_eq!(redact_for_log("блядство!"), "[CENSORED: 9 chars]");
    }
}
