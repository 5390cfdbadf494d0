// relaychat-core/tests/mention_tests.rs
use parking_lot::Mutex;
use std::sync::Arc;

use relaychat_core::config::MentionConfig;
use relaychat_core::markup;
use relaychat_core::{
    Identity, MentionResolver, Notification, Notifier, RelayError, SharedRoster, SoundKey, DEFAULT_MENTION_SOUND,
};

/// Records every notification; optionally refuses anything but the fallback sound.
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    only_fallback: bool,
    always_fail: bool,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) -> Result<(), RelayError> {
        if self.always_fail || (self.only_fallback && notification.sound != SoundKey::fallback()) {
            return Err(RelayError::NotificationFailed(
                notification.recipient.name().to_string(),
                "refused".to_string(),
            ));
        }
        self.sent.lock().push(notification);
        Ok(())
    }
}

struct Fixture {
    steve: Identity,
    alex: Identity,
    roster: Arc<SharedRoster>,
    notifier: Arc<RecordingNotifier>,
    resolver: MentionResolver,
}

fn fixture_with(config: MentionConfig, notifier: RecordingNotifier) -> Fixture {
    let steve = Identity::new("Steve");
    let alex = Identity::new("Alex");
    let roster = Arc::new(SharedRoster::from_identities([steve.clone(), alex.clone(), Identity::new("Alexandra")]));
    let notifier = Arc::new(notifier);
    let resolver = MentionResolver::new(roster.clone(), notifier.clone(), config);
    Fixture {
        steve,
        alex,
        roster,
        notifier,
        resolver,
    }
}

fn fixture() -> Fixture {
    fixture_with(MentionConfig::default(), RecordingNotifier::default())
}

#[test]
fn resolves_online_mention_with_canonical_name() {
    let f = fixture();
    let result = f.resolver.process_mentions("hey @alex look", &f.steve);
    assert_eq!(result.processed_text, "hey <gold>@Alex<reset> look");
    assert!(result.mentioned.contains(&f.alex));
    assert_eq!(result.mention_count(), 1);

    let sent = f.notifier.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, f.alex);
    assert_eq!(markup::parse(&sent[0].subtitle).plain_text(), "Steve mentioned you");
    assert_eq!(sent[0].sound.to_string(), DEFAULT_MENTION_SOUND);
}

#[test]
fn self_mention_is_left_alone() {
    let f = fixture();
    let result = f.resolver.process_mentions("I am @Steve", &f.steve);
    assert_eq!(result.processed_text, "I am @Steve");
    assert!(!result.has_mentions());
    assert!(f.notifier.sent.lock().is_empty());
}

#[test]
fn offline_mention_is_left_alone() {
    let f = fixture();
    let result = f.resolver.process_mentions("where is @Herobrine", &f.steve);
    assert_eq!(result.processed_text, "where is @Herobrine");
    assert!(result.mentioned.is_empty());
}

#[test]
fn duplicate_mentions_notify_once() {
    let f = fixture();
    let result = f.resolver.process_mentions("@Alex @alex @ALEX", &f.steve);
    assert_eq!(result.mention_count(), 1);
    assert_eq!(result.resolved.len(), 3);
    assert_eq!(result.processed_text.matches("<gold>@Alex<reset>").count(), 3);
    assert_eq!(f.notifier.sent.lock().len(), 1);
}

#[test]
fn disabled_mentions_return_text_unchanged() {
    let config = MentionConfig {
        enable: false,
        ..MentionConfig::default()
    };
    let f = fixture_with(config, RecordingNotifier::default());
    let result = f.resolver.process_mentions("@Alex", &f.steve);
    assert_eq!(result.processed_text, "@Alex");
    assert!(!result.has_mentions());
    assert!(f.resolver.complete_last_word("hi @al", &f.steve).is_none());
}

#[test]
fn departed_participant_is_no_longer_resolved() {
    let f = fixture();
    assert!(f.resolver.contains_mentions("@Alex"));
    f.roster.disconnect(&f.alex);
    assert!(!f.resolver.contains_mentions("@Alex"));
    assert_eq!(f.resolver.resolve("@Alex", &f.steve).processed_text, "@Alex");
}

#[test_log::test]
fn invalid_sound_falls_back() {
    let config = MentionConfig {
        sound: "Not A Sound!".to_string(),
        ..MentionConfig::default()
    };
    let f = fixture_with(config, RecordingNotifier::default());
    f.resolver.process_mentions("@Alex", &f.steve);
    let sent = f.notifier.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].sound, SoundKey::fallback());
}

#[test_log::test]
fn failed_dispatch_retries_with_fallback_sound() {
    let config = MentionConfig {
        sound: "entity.experience_orb.pickup".to_string(),
        ..MentionConfig::default()
    };
    let notifier = RecordingNotifier {
        only_fallback: true,
        ..RecordingNotifier::default()
    };
    let f = fixture_with(config, notifier);
    f.resolver.process_mentions("@Alex", &f.steve);
    assert_eq!(f.notifier.sent.lock()[0].sound, SoundKey::fallback());
}

#[test_log::test]
fn dispatch_failure_never_affects_the_text() {
    let notifier = RecordingNotifier {
        always_fail: true,
        ..RecordingNotifier::default()
    };
    let f = fixture_with(MentionConfig::default(), notifier);
    let result = f.resolver.process_mentions("@Alex hi", &f.steve);
    assert_eq!(result.processed_text, "<gold>@Alex<reset> hi");
    assert!(f.notifier.sent.lock().is_empty());
}

#[test]
fn suggestions_and_queries() {
    let f = fixture();
    let names: Vec<String> = f.resolver.suggestions("@ALE").iter().map(|p| p.name().to_string()).collect();
    assert_eq!(names, vec!["Alex", "Alexandra"]);
    assert_eq!(f.resolver.mention_suggestions("@st"), vec!["@Steve".to_string()]);
    assert!(f.resolver.mention_suggestions("@").is_empty());
    assert!(f.resolver.mention_suggestions("st").is_empty());

    let extracted = f.resolver.extract_mentioned_names("@alex and @Nobody and @STEVE");
    assert_eq!(extracted.len(), 2);
    assert!(extracted.contains("alex") && extracted.contains("STEVE"));
    assert!(f.resolver.is_valid_mention("ALEX"));
    assert!(!f.resolver.is_valid_mention("Nobody"));
}

#[test]
fn tab_completion_replaces_last_word() {
    let f = fixture();
    let completions = f.resolver.complete_last_word("hello there @alexa", &f.steve).unwrap();
    assert_eq!(completions, vec!["hello there @Alexandra".to_string()]);

    let completions = f.resolver.complete_last_word("@s", &f.alex).unwrap();
    assert_eq!(completions, vec!["@Steve".to_string()]);
    // The requester never completes to themselves.
    assert!(f.resolver.complete_last_word("@s", &f.steve).unwrap().is_empty());

    assert!(f.resolver.complete_last_word("hello", &f.steve).is_none());
    assert!(f.resolver.complete_last_word("/msg @al", &f.steve).is_none());
    assert!(f.resolver.complete_last_word("hi @", &f.steve).is_none());
}
