//! filter.rs - The live profanity filter.
//!
//! Holds the current [`RuleSet`] behind an [`ArcSwap`]. Every call loads the
//! reference once and uses that set for the whole call, so a concurrent
//! reload is observed either entirely or not at all.
//!
//! License: MIT OR APACHE 2.0

use arc_swap::ArcSwap;
use log::{debug, info};
use std::fmt::Write as _;
use std::sync::Arc;

use super::compiler::{PatternCompiler, RuleSet};
use crate::config::ProfanityConfig;
use crate::profanity_match::ProfanityMatch;

#[derive(Debug)]
pub struct ProfanityFilter {
    rules: ArcSwap<RuleSet>,
    compiler: PatternCompiler,
}

impl Default for ProfanityFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfanityFilter {
    /// Creates a filter with no rules and the default compiler.
    pub fn new() -> Self {
        Self::with_compiler(PatternCompiler::default())
    }

    pub fn with_compiler(compiler: PatternCompiler) -> Self {
        Self {
            rules: ArcSwap::from_pointee(RuleSet::default()),
            compiler,
        }
    }

    /// Builds a filter from the profanity section of the configuration.
    pub fn from_config(config: &ProfanityConfig) -> Self {
        let filter = Self::new();
        filter.reload(config);
        filter
    }

    /// Recompiles the word list from scratch and swaps it in, keeping the current mask.
    pub fn set_rules<S: AsRef<str>>(&self, words: &[S]) {
        let mask = self.rules.load().mask;
        self.install(words, mask);
    }

    /// Recompiles words and mask from configuration and swaps them in together.
    pub fn reload(&self, config: &ProfanityConfig) {
        self.install(&config.words, config.mask);
    }

    fn install<S: AsRef<str>>(&self, words: &[S], mask: char) {
        let compiled = self.compiler.compile_rules(words, mask);
        let count = compiled.len();
        self.rules.store(Arc::new(compiled));
        info!("Loaded {} profanity patterns with wildcard support", count);
    }

    /// The rule set a call starting now would use.
    pub fn snapshot(&self) -> Arc<RuleSet> {
        self.rules.load_full()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.load().len()
    }

    /// Masks every match, applying rules in order over the previous rule's output.
    pub fn censor(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }
        let rules = self.rules.load();
        let censored = rules.censor(text);
        if censored != text {
            debug!("Profanity censored in a {}-char message.", text.chars().count());
        }
        censored
    }

    /// True if any rule matches the unmodified text.
    pub fn contains_profanity(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.rules.load().rules.iter().any(|rule| rule.matcher.is_match(text))
    }

    pub fn is_profanity_word(&self, word: &str) -> bool {
        self.contains_profanity(word)
    }

    /// Every match of every rule against the unmodified text, in rule order.
    pub fn find_matches(&self, text: &str) -> Vec<ProfanityMatch> {
        let rules = self.rules.load();
        let mut matches = Vec::new();
        for (rule_index, rule) in rules.rules.iter().enumerate() {
            for m in rule.matcher.find_iter(text) {
                matches.push(ProfanityMatch {
                    rule_index,
                    rule_word: rule.raw_word.clone(),
                    start: m.start(),
                    end: m.end(),
                    text: m.as_str().to_string(),
                });
            }
        }
        matches
    }

    /// Human-readable list of matches for troubleshooting a word list.
    pub fn debug_report(&self, text: &str) -> String {
        let mut report = String::new();
        let _ = writeln!(report, "Testing message: '{}'", text);
        let _ = writeln!(report, "Profanity matches:");

        let matches = self.find_matches(text);
        if matches.is_empty() {
            let _ = writeln!(report, "  - No matches found");
        }
        for m in matches {
            let _ = writeln!(
                report,
                "  - Word {} ('{}') matched: '{}' at position {}-{}",
                m.rule_index, m.rule_word, m.text, m.start, m.end
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(words: &[&str]) -> ProfanityFilter {
        let f = ProfanityFilter::new();
        f.set_rules(words);
        f
    }

    #[test]
    fn censor_masks_each_match() {
        let f = filter(&["бля*", "хуй"]);
        assert_eq!(f.censor("ну бля, хуй знает"), "ну ***, *** знает");
    }

    #[test]
    fn censor_leaves_clean_and_blank_text_alone() {
        let f = filter(&["бля"]);
        assert_eq!(f.censor("привет"), "привет");
        assert_eq!(f.censor("   "), "   ");
    }

    #[test]
    fn later_rules_scan_the_masked_output() {
        // "*а" never matches the raw text, only the mask run left by "бля".
        assert!(!filter(&["*а"]).contains_profanity("бля а"));
        assert_eq!(filter(&["бля", "*а"]).censor("бля а"), "*****");
        assert_eq!(filter(&["*а", "бля"]).censor("бля а"), "*** а");
    }

    #[test]
    fn find_matches_is_not_deduplicated() {
        let f = filter(&["бля*", "бля"]);
        let matches = f.find_matches("бля");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].rule_index, 0);
        assert_eq!(matches[1].rule_word, "бля");
        assert_eq!((matches[0].start, matches[0].end), (0, "бля".len()));
    }

    #[test]
    fn reload_swaps_mask_and_words_together() {
        let f = filter(&["бля"]);
        f.reload(&ProfanityConfig {
            enable: true,
            mask: '#',
            words: vec!["хуй".to_string()],
        });
        assert_eq!(f.censor("бля хуй"), "бля ###");
        assert_eq!(f.rule_count(), 1);
    }

    #[test]
    fn debug_report_lists_positions() {
        let f = filter(&["бля"]);
        let report = f.debug_report("ok бля");
        assert!(report.contains("Word 0 ('бля') matched: 'бля' at position 3-9"));
        assert!(f.debug_report("ok").contains("No matches found"));
    }
}
