//! Conversation store - the single owner of the transcript.
//!
//! The transcript is append-only except for one operation: the most recent
//! pending placeholder is replaced in place when its answer arrives. Every
//! mutation is persisted and published before the mutating call returns, so
//! subscribers see mutations in exactly the order they happened.

use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

use crate::domain::message::Message;
use crate::events::{EventBus, Subscription, TranscriptEvent};
use crate::ports::storage::{KeyValueStore, keys};
use crate::settings::TranscriptPolicy;

/// Errors returned by transcript mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The last transcript entry is not a pending placeholder.
    #[error("No pending placeholder at the end of the transcript")]
    NoPendingEntry,
}

/// Ordered chat transcript with persistence and change notification.
pub struct ConversationStore {
    transcript: Mutex<Vec<Message>>,
    storage: Arc<dyn KeyValueStore>,
    events: EventBus<TranscriptEvent>,
}

impl ConversationStore {
    /// Open the store, applying `policy` to any previously persisted transcript.
    pub fn open(storage: Arc<dyn KeyValueStore>, policy: TranscriptPolicy) -> Self {
        let transcript = match policy {
            TranscriptPolicy::Restore => restore(storage.as_ref()),
            TranscriptPolicy::ClearOnStart => {
                if let Err(e) = storage.remove(keys::TRANSCRIPT) {
                    tracing::warn!(error = %e, "Failed to clear persisted transcript");
                }
                Vec::new()
            }
        };

        tracing::info!(
            ?policy,
            restored = transcript.len(),
            "Conversation store opened"
        );

        let store = Self {
            transcript: Mutex::new(transcript),
            storage,
            events: EventBus::new(),
        };
        if policy == TranscriptPolicy::Restore {
            let transcript = store.lock();
            store.persist(&transcript);
        }
        store
    }

    /// Add a message to the end. Returns its index.
    pub fn append(&self, message: Message) -> usize {
        let mut transcript = self.lock();
        transcript.push(message.clone());
        let index = transcript.len() - 1;
        self.persist(&transcript);
        tracing::debug!(index, sender = %message.sender, "Transcript append");
        self.events.emit(TranscriptEvent::Appended { index, message });
        index
    }

    /// Replace the trailing pending placeholder with `message`.
    ///
    /// Leaves the transcript untouched and fails with
    /// [`StoreError::NoPendingEntry`] if the last entry is not a placeholder.
    pub fn resolve_pending(&self, mut message: Message) -> Result<usize, StoreError> {
        let mut transcript = self.lock();
        let index = match transcript.last() {
            Some(last) if last.is_placeholder() => transcript.len() - 1,
            _ => return Err(StoreError::NoPendingEntry),
        };
        message.pending = false;
        transcript[index] = message.clone();
        self.persist(&transcript);
        tracing::debug!(index, "Transcript placeholder resolved");
        self.events.emit(TranscriptEvent::Resolved { index, message });
        Ok(index)
    }

    /// Empty the transcript and remove its persisted form.
    pub fn clear(&self) {
        let mut transcript = self.lock();
        transcript.clear();
        if let Err(e) = self.storage.remove(keys::TRANSCRIPT) {
            tracing::warn!(error = %e, "Failed to remove persisted transcript");
        }
        tracing::info!("Transcript cleared");
        self.events.emit(TranscriptEvent::Cleared);
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.lock().clone()
    }

    pub fn get(&self, index: usize) -> Option<Message> {
        self.lock().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The last `limit` resolved messages, oldest first.
    pub fn history(&self, limit: usize) -> Vec<Message> {
        let transcript = self.lock();
        let resolved: Vec<&Message> = transcript.iter().filter(|m| !m.pending).collect();
        let skip = resolved.len().saturating_sub(limit);
        resolved.into_iter().skip(skip).cloned().collect()
    }

    /// Receive every subsequent transcript mutation.
    pub fn subscribe(&self) -> Subscription<TranscriptEvent> {
        self.events.subscribe()
    }

    fn persist(&self, transcript: &[Message]) {
        let json = match serde_json::to_string(transcript) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize transcript");
                return;
            }
        };
        if let Err(e) = self.storage.set(keys::TRANSCRIPT, &json) {
            tracing::warn!(error = %e, "Failed to persist transcript");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Message>> {
        self.transcript
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Load a persisted transcript. Placeholders left behind by an interrupted
/// session can never be answered and are resolved to the failure text.
fn restore(storage: &dyn KeyValueStore) -> Vec<Message> {
    let raw = match storage.get(keys::TRANSCRIPT) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read persisted transcript");
            return Vec::new();
        }
    };

    let mut transcript: Vec<Message> = match serde_json::from_str(&raw) {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!(error = %e, "Discarding corrupt persisted transcript");
            return Vec::new();
        }
    };

    for message in transcript.iter_mut().filter(|m| m.is_placeholder()) {
        *message = Message::failure();
    }
    transcript
}
