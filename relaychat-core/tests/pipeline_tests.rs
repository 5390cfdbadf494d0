// relaychat-core/tests/pipeline_tests.rs
use std::sync::Arc;
use std::thread;

use relaychat_core::markup::{self, NamedColor, TextColor};
use relaychat_core::{
    ChannelNotifier, ChatOutcome, ChatPipeline, ChatRoute, Identity, Notification, RelayConfig, SharedRoster,
    SuppressReason,
};
use tokio::sync::mpsc::Receiver;

struct Harness {
    steve: Identity,
    alex: Identity,
    pipeline: ChatPipeline,
    rx: Receiver<Notification>,
}

fn harness(config: RelayConfig) -> Harness {
    let steve = Identity::new("Steve");
    let alex = Identity::new("Alex");
    let roster = Arc::new(SharedRoster::from_identities([steve.clone(), alex.clone()]));
    let (notifier, rx) = ChannelNotifier::channel(32);
    let pipeline = ChatPipeline::new(config, roster, Arc::new(notifier)).unwrap();
    Harness {
        steve,
        alex,
        pipeline,
        rx,
    }
}

fn with_words(words: &[&str]) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.profanity.words = words.iter().map(|w| w.to_string()).collect();
    config
}

fn plain(outcome: &ChatOutcome) -> String {
    markup::parse(&outcome.broadcast().unwrap().formatted).plain_text()
}

#[test_log::test]
fn full_pipeline_censors_mentions_and_formats() {
    let mut h = harness(with_words(&["бля*"]));
    let outcome = h.pipeline.process(&h.steve, Some("lobby"), "бля, @alex!");
    let broadcast = outcome.broadcast().unwrap();

    assert_eq!(plain(&outcome), "Steve > ***, @Alex!");
    assert!(broadcast.censored);
    assert_eq!(broadcast.notified, vec![h.alex.clone()]);
    assert_eq!(broadcast.route, ChatRoute::BroadcastAll);
    assert!(broadcast.warning.is_none());

    let component = markup::parse(&broadcast.formatted);
    let mention = component.span_containing("@Alex").unwrap();
    assert_eq!(mention.style.color, Some(TextColor::Named(NamedColor::Gold)));

    let notification = h.rx.try_recv().unwrap();
    assert_eq!(notification.recipient, h.alex);
    assert!(h.rx.try_recv().is_err());
}

#[test]
fn default_word_list_censors_out_of_the_box() {
    let h = harness(RelayConfig::default());
    let outcome = h.pipeline.process(&h.steve, Some("lobby"), "ну бля, сука, bitch");
    assert_eq!(plain(&outcome), "Steve > ну ***, сука, *****");
    assert!(outcome.broadcast().unwrap().censored);
}

#[test]
fn participant_markup_renders_literally_by_default() {
    let h = harness(RelayConfig::default());
    let outcome = h.pipeline.process(&h.steve, Some("lobby"), r"<red>hi</red> \o/ @Alex");
    assert_eq!(plain(&outcome), r"Steve > <red>hi</red> \o/ @Alex");

    let component = markup::parse(&outcome.broadcast().unwrap().formatted);
    let typed = component.span_containing("<red>hi</red>").unwrap();
    assert_eq!(typed.style.color, None);
    // The highlight is still interpreted.
    let mention = component.span_containing("@Alex").unwrap();
    assert_eq!(mention.style.color, Some(TextColor::Named(NamedColor::Gold)));
}

#[test]
fn parsed_player_messages_are_interpreted() {
    let mut config = RelayConfig::default();
    config.chat.parse_player_messages = true;
    let h = harness(config);
    let outcome = h.pipeline.process(&h.steve, Some("lobby"), "<red>hi");
    let component = markup::parse(&outcome.broadcast().unwrap().formatted);
    assert_eq!(component.plain_text(), "Steve > hi");
    assert_eq!(
        component.span_containing("hi").unwrap().style.color,
        Some(TextColor::Named(NamedColor::Red))
    );
}

#[test]
fn urls_become_clickable() {
    let h = harness(RelayConfig::default());
    let outcome = h.pipeline.process(&h.steve, Some("lobby"), "see https://example.org/a?b=1 ok");
    let component = markup::parse(&outcome.broadcast().unwrap().formatted);
    assert_eq!(component.plain_text(), "Steve > see https://example.org/a?b=1 ok");
    let link = component.span_containing("example.org").unwrap();
    assert_eq!(link.link.as_deref(), Some("https://example.org/a?b=1"));
}

#[test]
fn urls_stay_plain_when_not_clickable() {
    let mut config = RelayConfig::default();
    config.urls.clickable = false;
    let h = harness(config);
    let outcome = h.pipeline.process(&h.steve, Some("lobby"), "https://example.org");
    let component = markup::parse(&outcome.broadcast().unwrap().formatted);
    assert!(component.spans().iter().all(|s| s.link.is_none()));
}

#[test]
fn soft_prefix_only_is_suppressed_before_formatting() {
    let h = harness(RelayConfig::default());
    match h.pipeline.process(&h.steve, Some("lobby"), "!   ") {
        ChatOutcome::Suppressed { reason, warning } => {
            assert_eq!(reason, SuppressReason::EmptyMessage);
            assert!(warning.is_some());
        }
        other => panic!("expected suppression, got {:?}", other),
    }
    assert!(matches!(
        h.pipeline.process(&h.steve, Some("lobby"), "   "),
        ChatOutcome::Suppressed { warning: None, .. }
    ));
}

#[test]
fn profanity_disabled_leaves_text() {
    let mut config = with_words(&["бля"]);
    config.profanity.enable = false;
    let h = harness(config);
    let outcome = h.pipeline.process(&h.steve, Some("lobby"), "бля");
    assert_eq!(plain(&outcome), "Steve > бля");
    assert!(!outcome.broadcast().unwrap().censored);
}

#[test]
fn self_mention_does_not_notify() {
    let mut h = harness(RelayConfig::default());
    let outcome = h.pipeline.process(&h.steve, Some("lobby"), "it's me @steve");
    assert!(outcome.broadcast().unwrap().notified.is_empty());
    assert_eq!(plain(&outcome), "Steve > it's me @steve");
    assert!(h.rx.try_recv().is_err());
}

#[test]
fn reload_replaces_words_and_format() {
    let h = harness(with_words(&["бля"]));
    let mut next = with_words(&["хуй"]);
    next.chat.format = "[<server>] <player>: <message>".to_string();
    h.pipeline.reload(next).unwrap();

    let outcome = h.pipeline.process(&h.steve, Some("lobby"), "бля хуй");
    assert_eq!(plain(&outcome), "[lobby] Steve: бля ***");
}

#[test]
fn reload_with_profanity_disabled_keeps_previous_rules() {
    let h = harness(with_words(&["бля"]));
    let mut next = with_words(&["хуй"]);
    next.profanity.enable = false;
    h.pipeline.reload(next).unwrap();
    assert_eq!(h.pipeline.filter().censor("бля хуй"), "*** хуй");
}

#[test]
fn concurrent_reload_never_mixes_generations() {
    let h = harness(with_words(&["бля"]));
    let pipeline = Arc::new(h.pipeline);
    let steve = h.steve.clone();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let pipeline = Arc::clone(&pipeline);
            let steve = steve.clone();
            thread::spawn(move || {
                for _ in 0..300 {
                    let outcome = pipeline.process(&steve, Some("lobby"), "бля хуй");
                    let text = plain(&outcome);
                    assert!(
                        text == "Steve > *** хуй" || text == "Steve > бля ###",
                        "mixed output: {}",
                        text
                    );
                }
            })
        })
        .collect();

    for i in 0..100 {
        let mut next = if i % 2 == 0 { with_words(&["хуй"]) } else { with_words(&["бля"]) };
        next.profanity.mask = if i % 2 == 0 { '#' } else { '*' };
        next.chat.log_to_console = false;
        pipeline.reload(next).unwrap();
    }

    for r in readers {
        r.join().unwrap();
    }
}
