//! Session identity: the display name and avatar the user picked.

use serde::{Deserialize, Serialize};

/// Display name used until the user renames the assistant.
pub const DEFAULT_DISPLAY_NAME: &str = "SMARTIE";

/// Avatar shown until the user picks one.
pub const DEFAULT_AVATAR: &str = "chat-icon.png";

/// Built-in avatars offered by the avatar picker.
pub const AVATAR_CHOICES: [&str; 4] = ["avatar1.png", "avatar2.png", "avatar3.png", "avatar4.png"];

/// Name and avatar, persisted independently of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub display_name: String,
    pub avatar_ref: String,
}

impl Default for SessionIdentity {
    fn default() -> Self {
        Self {
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            avatar_ref: DEFAULT_AVATAR.to_string(),
        }
    }
}
