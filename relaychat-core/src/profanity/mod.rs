//! Fuzzy profanity matching for relaychat.
//!
//! `compiler` turns configured word rules into matchers tolerant of homoglyphs,
//! leetspeak and separator padding. `filter` owns the live rule set and applies
//! it to chat text, masking matches without changing their length.

pub mod compiler;
pub mod filter;
