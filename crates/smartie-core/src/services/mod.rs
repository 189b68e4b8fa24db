//! Stateful services built on the ports.

pub mod conversation_store;
pub mod profile;

pub use conversation_store::{ConversationStore, StoreError};
pub use profile::{ProfileError, ProfileService};
