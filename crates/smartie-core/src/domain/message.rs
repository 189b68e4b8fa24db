//! Chat message domain types.
//!
//! These types represent transcript entries independent of how they are
//! rendered or stored.

use serde::{Deserialize, Serialize};

/// Text shown in a bot placeholder while its answer is outstanding.
pub const PLACEHOLDER_TEXT: &str = "Thinking…";

/// Text a placeholder is resolved to when the answer service fails.
pub const FAILURE_TEXT: &str = "Sorry, something went wrong. Please try again.";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Convert sender to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a submitted utterance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    #[default]
    Typed,
    Voice,
}

/// A source reference attached to a bot answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub label: String,
    pub url: String,
}

impl Citation {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    /// RFC 3339 creation time.
    pub timestamp: String,
    #[serde(default)]
    pub is_voice_origin: bool,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub speakable: bool,
    /// Set only on a bot placeholder awaiting its answer.
    #[serde(default)]
    pub pending: bool,
}

impl Message {
    /// A message typed or spoken by the user.
    pub fn user(text: impl Into<String>, origin: Origin) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            timestamp: now_timestamp(),
            is_voice_origin: origin == Origin::Voice,
            citations: Vec::new(),
            speakable: false,
            pending: false,
        }
    }

    /// The provisional bot entry appended right after a user message.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            sender: Sender::Bot,
            text: PLACEHOLDER_TEXT.to_string(),
            timestamp: now_timestamp(),
            is_voice_origin: false,
            citations: Vec::new(),
            speakable: false,
            pending: true,
        }
    }

    /// A resolved bot answer.
    pub fn answer(text: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            timestamp: now_timestamp(),
            is_voice_origin: false,
            citations,
            speakable: true,
            pending: false,
        }
    }

    /// The bot entry used when no answer could be obtained.
    #[must_use]
    pub fn failure() -> Self {
        Self {
            sender: Sender::Bot,
            text: FAILURE_TEXT.to_string(),
            timestamp: now_timestamp(),
            is_voice_origin: false,
            citations: Vec::new(),
            speakable: false,
            pending: false,
        }
    }

    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        self.pending && matches!(self.sender, Sender::Bot)
    }

    #[must_use]
    pub const fn is_user(&self) -> bool {
        matches!(self.sender, Sender::User)
    }
}

fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
