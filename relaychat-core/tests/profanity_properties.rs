// relaychat-core/tests/profanity_properties.rs
use std::sync::Arc;
use std::thread;

use relaychat_core::config::ProfanityConfig;
use relaychat_core::profanity::compiler::equivalents;
use relaychat_core::ProfanityFilter;

const WORDS: &[&str] = &["бля*", "хуй", "сука", "пизд*", "еба"];

fn filter() -> ProfanityFilter {
    let f = ProfanityFilter::new();
    f.set_rules(WORDS);
    f
}

/// Swaps every character for the last entry of its equivalence class.
fn homoglyph_variant(word: &str) -> String {
    word.chars()
        .map(|c| equivalents(c).and_then(|class| class.chars().last()).unwrap_or(c))
        .collect()
}

#[test_log::test]
fn every_configured_word_is_detected() {
    let f = filter();
    for word in WORDS.iter().map(|w| w.trim_end_matches('*')) {
        assert!(f.contains_profanity(word), "{} should be detected", word);
        assert!(f.contains_profanity(&word.to_uppercase()), "upper-case {}", word);
        let variant = homoglyph_variant(word);
        assert!(f.contains_profanity(&variant), "variant {} of {}", variant, word);
    }
}

#[test]
fn censor_preserves_length_and_leaves_no_base_word() {
    let f = filter();
    let input = "ну бля, это с у к а и х.у.й, пиздец";
    let out = f.censor(input);
    assert_eq!(out.chars().count(), input.chars().count());
    for word in WORDS.iter().map(|w| w.trim_end_matches('*')) {
        assert!(!out.contains(word), "{} survived in {}", word, out);
    }
    assert_eq!(out, "ну ***, это ******* и *****, ******");
}

#[test]
fn wildcard_and_plain_rule_semantics() {
    let wildcard = ProfanityFilter::new();
    wildcard.set_rules(&["бля*"]);
    assert!(wildcard.contains_profanity("бля"));
    assert!(wildcard.contains_profanity("блядство"));
    assert!(wildcard.contains_profanity("б-л-я"));

    let plain = ProfanityFilter::new();
    plain.set_rules(&["бля"]);
    assert!(!plain.contains_profanity("блядство"));
}

#[test]
fn whole_token_boundaries_use_letters_not_punctuation() {
    let f = ProfanityFilter::new();
    f.set_rules(&["хуй"]);
    assert_eq!(f.censor("(хуй)"), "(***)");
    assert_eq!(f.censor("123хуй"), "123***");
    assert_eq!(f.censor("нахуй"), "нахуй");
}

#[test]
fn empty_word_list_changes_nothing() {
    let f = ProfanityFilter::new();
    assert_eq!(f.censor("бля"), "бля");
    assert!(!f.contains_profanity("бля"));
    assert!(f.find_matches("бля").is_empty());
}

#[test]
fn reload_during_censor_never_mixes_generations() {
    let f = Arc::new(ProfanityFilter::new());
    f.reload(&ProfanityConfig {
        enable: true,
        mask: '*',
        words: vec!["бля".to_string()],
    });

    let text = "бля хуй";
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let f = Arc::clone(&f);
            thread::spawn(move || {
                for _ in 0..500 {
                    let out = f.censor(text);
                    // One generation masks only the first word, the other only the second.
                    assert!(out == "*** хуй" || out == "бля ###", "mixed output: {}", out);
                }
            })
        })
        .collect();

    for i in 0..200 {
        let (mask, word) = if i % 2 == 0 { ('#', "хуй") } else { ('*', "бля") };
        f.reload(&ProfanityConfig {
            enable: true,
            mask,
            words: vec![word.to_string()],
        });
    }

    for r in readers {
        r.join().unwrap();
    }
}
