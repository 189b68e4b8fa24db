//! Integration tests for transcript and profile persistence.
//!
//! Both services share one in-memory key-value store, the way a session
//! wires them, and are reopened to simulate a reload.

use std::sync::Arc;

use smartie_core::{
    Citation, ConversationStore, FAILURE_TEXT, KeyValueStore, MemoryStore, Message, Origin,
    ProfileService, Sender, StoreError, Theme, TranscriptEvent, TranscriptPolicy, keys,
};

// ── Helpers ────────────────────────────────────────────────────────

fn shared_storage() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// Append a user message and its placeholder, then resolve it.
fn answered_turn(store: &ConversationStore, question: &str, answer: &str) -> usize {
    store.append(Message::user(question, Origin::Typed));
    store.append(Message::placeholder());
    store
        .resolve_pending(Message::answer(answer, Vec::new()))
        .expect("placeholder present")
}

// ── Tests ──────────────────────────────────────────────────────────

#[test]
fn turns_alternate_user_and_bot() {
    let store = ConversationStore::open(shared_storage(), TranscriptPolicy::Restore);
    for i in 0..5 {
        answered_turn(&store, &format!("q{i}"), &format!("a{i}"));
    }

    let transcript = store.snapshot();
    assert_eq!(transcript.len(), 10);
    for (i, message) in transcript.iter().enumerate() {
        let expected = if i % 2 == 0 { Sender::User } else { Sender::Bot };
        assert_eq!(message.sender, expected, "entry {i}");
        assert!(!message.pending);
    }
}

#[test]
fn clearing_transcript_keeps_identity_and_preferences() {
    let storage = shared_storage();
    let store = ConversationStore::open(storage.clone(), TranscriptPolicy::Restore);
    let profile = ProfileService::open(storage.clone());

    profile.rename("Ada").unwrap();
    profile.set_theme(Theme::Purple);
    answered_turn(&store, "hello", "hi");
    store.clear();

    assert!(store.is_empty());
    assert!(storage.get(keys::TRANSCRIPT).unwrap().is_none());
    assert!(storage.get(keys::IDENTITY).unwrap().is_some());

    let reopened = ProfileService::open(storage);
    assert_eq!(reopened.identity().display_name, "Ada");
    assert_eq!(reopened.preferences().theme, Theme::Purple);
}

#[test]
fn reload_restores_citations_and_voice_origin() {
    let storage = shared_storage();
    {
        let store = ConversationStore::open(storage.clone(), TranscriptPolicy::Restore);
        store.append(Message::user("where is milk", Origin::Voice));
        store.append(Message::placeholder());
        store
            .resolve_pending(Message::answer(
                "Try Store A",
                vec![Citation::new("1", "http://a")],
            ))
            .unwrap();
    }

    let store = ConversationStore::open(storage, TranscriptPolicy::Restore);
    let transcript = store.snapshot();
    assert_eq!(transcript.len(), 2);
    assert!(transcript[0].is_voice_origin);
    assert_eq!(transcript[1].citations, vec![Citation::new("1", "http://a")]);
    assert!(transcript[1].speakable);
}

#[test]
fn interrupted_turn_is_restored_as_failure() {
    let storage = shared_storage();
    {
        let store = ConversationStore::open(storage.clone(), TranscriptPolicy::Restore);
        store.append(Message::user("q", Origin::Typed));
        store.append(Message::placeholder());
    }

    let store = ConversationStore::open(storage, TranscriptPolicy::Restore);
    assert_eq!(store.get(1).unwrap().text, FAILURE_TEXT);
    assert_eq!(
        store.resolve_pending(Message::answer("late", Vec::new())),
        Err(StoreError::NoPendingEntry)
    );
}

#[tokio::test]
async fn subscription_receives_events_across_tasks() {
    let store = Arc::new(ConversationStore::open(
        shared_storage(),
        TranscriptPolicy::Restore,
    ));
    let mut sub = store.subscribe();

    let writer = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { answered_turn(&store, "q", "a") })
    };
    assert_eq!(writer.await.unwrap(), 1);

    assert!(matches!(
        sub.recv().await,
        Some(TranscriptEvent::Appended { index: 0, .. })
    ));
    assert!(matches!(
        sub.recv().await,
        Some(TranscriptEvent::Appended { index: 1, .. })
    ));
    match sub.recv().await {
        Some(TranscriptEvent::Resolved { index, message }) => {
            assert_eq!(index, 1);
            assert_eq!(message.text, "a");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn cancelled_subscription_stops_receiving() {
    let store = ConversationStore::open(shared_storage(), TranscriptPolicy::Restore);
    let sub = store.subscribe();
    sub.cancel();
    let mut live = store.subscribe();

    store.append(Message::user("q", Origin::Typed));
    assert_eq!(live.drain().len(), 1);
}
