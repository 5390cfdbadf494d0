//! compiler.rs - Compiles profanity word rules into fuzzy matchers.
//!
//! A word rule such as `"бля*"` becomes a case-insensitive regular expression
//! in which every character is widened to its homoglyph/leetspeak class,
//! separators are tolerated between characters, and a trailing `*` accepts
//! any letter continuation. Matches are only accepted on whole tokens: the
//! character before and after a match must not be a letter.
//!
//! License: MIT OR APACHE 2.0

use lazy_static::lazy_static;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Match, Regex, RegexBuilder};
use std::collections::HashMap;

use crate::errors::RelayError;

/// Characters tolerated between two characters of a word (`б-л-я`, `b l y a`).
const SEPARATOR: &str = r"[\s\-_.*]*?";

/// Letter continuation appended to wildcard rules.
const WILDCARD_SUFFIX: &str = r"\p{L}*";

/// Default limit for a single compiled fuzzy pattern.
pub const DEFAULT_SIZE_LIMIT: usize = 10 * (1 << 20);

// Keys are lower-case. Lookup lower-cases the rule character first.
static EQUIVALENCE_TABLE: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    let mut table = HashMap::new();
    table.extend([
        ('а', "аa@4"),
        ('б', "бb6"),
        ('в', "вv"),
        ('г', "гg"),
        ('д', "дd"),
        ('е', "еёe3"),
        ('ё', "еёe3"),
        ('з', "зz3"),
        ('и', "иi1!"),
        ('й', "йи"),
        ('к', "кk"),
        ('л', "лl"),
        ('м', "мm"),
        ('н', "нn"),
        ('о', "оo0"),
        ('п', "пp"),
        ('р', "рp"),
        ('с', "сc$"),
        ('т', "тt"),
        ('у', "уy"),
        ('ф', "фf"),
        ('х', "хx"),
        ('ц', "ц"),
        ('ч', "ч"),
        ('ш', "ш"),
        ('щ', "щ"),
        ('ъ', "ъ"),
        ('ы', "ы"),
        ('ь', "ь"),
        ('э', "э"),
        ('ю', "ю"),
        ('я', "я"),
    ]);
    table
});

lazy_static! {
    static ref LETTER: Regex = Regex::new(r"^\p{L}$").unwrap();
}

fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Returns every character interchangeable with `c`, or `None` if `c` only matches itself.
pub fn equivalents(c: char) -> Option<&'static str> {
    EQUIVALENCE_TABLE.get(&lower(c)).copied()
}

fn char_class(c: char) -> String {
    match equivalents(c) {
        Some(class) => format!("[{}]", class),
        None => regex::escape(c.encode_utf8(&mut [0u8; 4])),
    }
}

pub(crate) fn is_letter(c: char) -> bool {
    let mut buf = [0u8; 4];
    LETTER.is_match(c.encode_utf8(&mut buf))
}

fn is_token_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_letter) && !after.is_some_and(is_letter)
}

/// Builds the fuzzy pattern source for a base word (wildcard already stripped).
pub fn build_pattern(base_word: &str, has_wildcard: bool) -> String {
    let chars: Vec<char> = base_word.chars().collect();
    let mut pattern = String::with_capacity(chars.len() * 16);

    for (i, c) in chars.iter().enumerate() {
        pattern.push_str(&char_class(*c));
        if i + 1 < chars.len() {
            pattern.push_str(SEPARATOR);
        }
    }

    if has_wildcard {
        pattern.push_str(WILDCARD_SUFFIX);
    }
    pattern
}

/// Whether a rule is matched through its fuzzy pattern or the literal fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherKind {
    Fuzzy,
    Literal,
}

/// A compiled matcher. Fuzzy matchers only report whole-token matches.
#[derive(Debug)]
pub struct Matcher {
    regex: Regex,
    kind: MatcherKind,
}

impl Matcher {
    pub fn kind(&self) -> MatcherKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Iterates over accepted, non-overlapping matches from left to right.
    pub fn find_iter<'r, 't>(&'r self, text: &'t str) -> TokenMatches<'r, 't> {
        TokenMatches {
            matcher: self,
            text,
            pos: 0,
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.find_iter(text).next().is_some()
    }
}

/// Iterator returned by [`Matcher::find_iter`].
///
/// A candidate rejected by the token boundary check resumes the search one
/// character after its start, so a later valid match is never skipped.
pub struct TokenMatches<'r, 't> {
    matcher: &'r Matcher,
    text: &'t str,
    pos: usize,
}

impl<'r, 't> Iterator for TokenMatches<'r, 't> {
    type Item = Match<'t>;

    fn next(&mut self) -> Option<Match<'t>> {
        while self.pos <= self.text.len() {
            let m = self.matcher.regex.find_at(self.text, self.pos)?;
            let accepted = match self.matcher.kind {
                MatcherKind::Fuzzy => is_token_bounded(self.text, m.start(), m.end()),
                MatcherKind::Literal => true,
            };
            let step = self.text[m.start()..].chars().next().map_or(1, char::len_utf8);

            if accepted {
                self.pos = if m.end() > m.start() { m.end() } else { m.start() + step };
                return Some(m);
            }
            self.pos = m.start() + step;
        }
        None
    }
}

/// Represents a single compiled word rule. Immutable once built.
#[derive(Debug)]
pub struct CompiledRule {
    /// The word exactly as configured, including any trailing `*`.
    pub raw_word: String,
    pub has_wildcard: bool,
    pub matcher: Matcher,
}

impl CompiledRule {
    pub fn is_fallback(&self) -> bool {
        self.matcher.kind == MatcherKind::Literal
    }

    /// Replaces every match with `mask` repeated once per character of the match.
    pub fn censor(&self, text: &str, mask: char) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last_end = 0usize;

        for m in self.matcher.find_iter(text) {
            out.push_str(&text[last_end..m.start()]);
            let width = m.as_str().chars().count();
            out.extend(std::iter::repeat(mask).take(width));
            crate::profanity_match::log_censor_debug(&self.raw_word, m.as_str(), width);
            last_end = m.end();
        }

        if last_end == 0 {
            return text.to_string();
        }
        out.push_str(&text[last_end..]);
        out
    }
}

/// An ordered, immutable set of compiled rules plus the mask used to censor with it.
#[derive(Debug)]
pub struct RuleSet {
    pub rules: Vec<CompiledRule>,
    pub mask: char,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            mask: '*',
        }
    }
}

impl RuleSet {
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Applies every rule in order, each one scanning the previous rule's output.
    pub fn censor(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, rule| rule.censor(&acc, self.mask))
    }
}

/// Turns raw word rules into [`CompiledRule`]s.
#[derive(Debug, Clone)]
pub struct PatternCompiler {
    size_limit: usize,
}

impl Default for PatternCompiler {
    fn default() -> Self {
        Self {
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }
}

impl PatternCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the compiled-size limit of fuzzy patterns.
    pub fn with_size_limit(mut self, size_limit: usize) -> Self {
        self.size_limit = size_limit;
        self
    }

    /// Compiles the fuzzy matcher for one word, without any fallback.
    pub fn compile_fuzzy(&self, raw_word: &str) -> Result<CompiledRule, RelayError> {
        let (base_word, has_wildcard) = split_wildcard(raw_word);
        let pattern = build_pattern(base_word, has_wildcard);

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .unicode(true)
            .size_limit(self.size_limit)
            .build()
            .map_err(|e| RelayError::RuleCompilationError(raw_word.to_string(), e))?;

        Ok(CompiledRule {
            raw_word: raw_word.to_string(),
            has_wildcard,
            matcher: Matcher {
                regex,
                kind: MatcherKind::Fuzzy,
            },
        })
    }

    /// Compiles one word, falling back to a literal match of the raw word if the
    /// fuzzy pattern cannot be built. Returns `None` for blank words.
    pub fn compile(&self, raw_word: &str) -> Option<CompiledRule> {
        let (base_word, _) = split_wildcard(raw_word);
        if base_word.trim().is_empty() {
            warn!("Skipping blank profanity word rule '{}'.", raw_word);
            return None;
        }

        match self.compile_fuzzy(raw_word) {
            Ok(rule) => {
                debug!(
                    target: "relaychat_core::profanity",
                    "Word rule '{}' compiled to pattern '{}'.",
                    rule.raw_word,
                    rule.matcher.as_str()
                );
                Some(rule)
            }
            Err(e) => {
                warn!("{}; falling back to literal matching.", e);
                literal_rule(raw_word)
            }
        }
    }

    /// Compiles a whole word list, preserving order. One bad word never aborts the rest.
    pub fn compile_rules<S: AsRef<str>>(&self, words: &[S], mask: char) -> RuleSet {
        debug!("Starting compilation of {} word rules.", words.len());
        let rules: Vec<CompiledRule> = words.iter().filter_map(|w| self.compile(w.as_ref())).collect();
        let fallbacks = rules.iter().filter(|r| r.is_fallback()).count();
        debug!(
            "Finished compiling word rules. Total compiled: {}, literal fallbacks: {}.",
            rules.len(),
            fallbacks
        );
        RuleSet { rules, mask }
    }
}

fn split_wildcard(raw_word: &str) -> (&str, bool) {
    match raw_word.strip_suffix('*') {
        Some(base) => (base, true),
        None => (raw_word, false),
    }
}

fn literal_rule(raw_word: &str) -> Option<CompiledRule> {
    match RegexBuilder::new(&regex::escape(raw_word)).case_insensitive(true).build() {
        Ok(regex) => Some(CompiledRule {
            raw_word: raw_word.to_string(),
            has_wildcard: false,
            matcher: Matcher {
                regex,
                kind: MatcherKind::Literal,
            },
        }),
        Err(e) => {
            warn!("Dropping word rule '{}': literal fallback failed to compile: {}", raw_word, e);
            None
        }
    }
}
