//! Domain types for the conversation session.

pub mod identity;
pub mod message;
pub mod preferences;

pub use identity::{AVATAR_CHOICES, DEFAULT_AVATAR, DEFAULT_DISPLAY_NAME, SessionIdentity};
pub use message::{Citation, FAILURE_TEXT, Message, Origin, PLACEHOLDER_TEXT, Sender};
pub use preferences::{FontSize, Preferences, Theme, UnknownPreference, WindowSize};
