//! Integration tests for `JsonFileStore`.

use std::fs;
use std::sync::Arc;

use smartie_core::{ConversationStore, KeyValueStore, Message, Origin, TranscriptPolicy};
use smartie_store::JsonFileStore;

#[test]
fn values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");

    {
        let store = JsonFileStore::open(&path).unwrap();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.set("a", "3").unwrap();
        store.remove("b").unwrap();
    }

    let store = JsonFileStore::open(&path).unwrap();
    assert_eq!(store.get("a").unwrap().as_deref(), Some("3"));
    assert!(store.get("b").unwrap().is_none());
    assert!(!path.with_file_name("session.json.tmp").exists());
}

#[test]
fn corrupt_file_is_moved_aside() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    fs::write(&path, "{not json").unwrap();

    let store = JsonFileStore::open(&path).unwrap();
    assert!(store.get("a").unwrap().is_none());
    assert_eq!(
        fs::read_to_string(dir.path().join("session.json.corrupt")).unwrap(),
        "{not json"
    );

    store.set("a", "1").unwrap();
    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["a"], "1");
}

#[test]
fn transcript_is_restored_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    {
        let storage = Arc::new(JsonFileStore::open(&path).unwrap());
        let store = ConversationStore::open(storage, TranscriptPolicy::Restore);
        store.append(Message::user("where is milk", Origin::Voice));
        store.append(Message::answer("Aisle 4", Vec::new()));
    }

    let storage = Arc::new(JsonFileStore::open(&path).unwrap());
    let store = ConversationStore::open(storage, TranscriptPolicy::Restore);
    let transcript = store.snapshot();
    assert_eq!(transcript.len(), 2);
    assert!(transcript[0].is_voice_origin);
    assert_eq!(transcript[1].text, "Aisle 4");
}
