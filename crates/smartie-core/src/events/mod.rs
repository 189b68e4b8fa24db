//! Event plumbing shared by the store and the voice controllers.
//!
//! Each component that publishes state changes owns an [`EventBus`] and hands
//! out [`Subscription`]s. Event payloads are plain enums so that any adapter
//! (terminal, web view, test) can consume them.

mod bus;

use serde::Serialize;

use crate::domain::message::Message;

pub use bus::{EventBus, Subscription};

/// Transcript mutations, published by the conversation store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptEvent {
    /// A message was added at `index`.
    Appended { index: usize, message: Message },

    /// The pending placeholder at `index` was replaced.
    Resolved { index: usize, message: Message },

    /// The transcript was emptied.
    Cleared,
}
