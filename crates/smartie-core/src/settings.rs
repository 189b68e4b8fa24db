//! Session configuration types and validation.
//!
//! These are pure domain types with no infrastructure dependencies. Adapters
//! build a [`SessionConfig`] from flags, environment, or a JSON document.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default upper bound on one answer request, in seconds.
pub const DEFAULT_ANSWER_TIMEOUT_SECS: u64 = 30;

/// Default upper bound on the best-effort location lookup, in milliseconds.
pub const DEFAULT_LOCATION_TIMEOUT_MS: u64 = 3_000;

/// Default number of prior messages sent as chat history.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Default audio-level sampling period while listening, in milliseconds.
pub const DEFAULT_LEVEL_INTERVAL_MS: u64 = 100;

/// What happens to the persisted transcript when a session opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranscriptPolicy {
    /// Reload the transcript saved by the previous session.
    #[default]
    Restore,
    /// Start every session with an empty transcript.
    ClearOnStart,
}

/// Session configuration.
///
/// Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub transcript_policy: TranscriptPolicy,

    /// Speak replies to spoken questions.
    pub auto_speak_voice: bool,

    /// Speak replies to typed questions.
    pub auto_speak_typed: bool,

    pub answer_timeout_secs: u64,

    pub location_timeout_ms: u64,

    /// Maximum number of prior messages sent with each question.
    pub history_limit: usize,

    /// BCP 47 language tag passed to speech recognition.
    pub recognition_language: String,

    pub level_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            transcript_policy: TranscriptPolicy::Restore,
            auto_speak_voice: true,
            auto_speak_typed: false,
            answer_timeout_secs: DEFAULT_ANSWER_TIMEOUT_SECS,
            location_timeout_ms: DEFAULT_LOCATION_TIMEOUT_MS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            recognition_language: "en-US".to_string(),
            level_interval_ms: DEFAULT_LEVEL_INTERVAL_MS,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub const fn answer_timeout(&self) -> Duration {
        Duration::from_secs(self.answer_timeout_secs)
    }

    #[must_use]
    pub const fn location_timeout(&self) -> Duration {
        Duration::from_millis(self.location_timeout_ms)
    }

    #[must_use]
    pub const fn level_interval(&self) -> Duration {
        Duration::from_millis(self.level_interval_ms)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=600).contains(&self.answer_timeout_secs) {
            return Err(ConfigError::InvalidAnswerTimeout(self.answer_timeout_secs));
        }
        if self.location_timeout_ms > 60_000 {
            return Err(ConfigError::InvalidLocationTimeout(self.location_timeout_ms));
        }
        if !(10..=5_000).contains(&self.level_interval_ms) {
            return Err(ConfigError::InvalidLevelInterval(self.level_interval_ms));
        }
        if self.recognition_language.trim().is_empty() {
            return Err(ConfigError::EmptyLanguage);
        }
        Ok(())
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Answer timeout must be between 1 and 600 seconds, got {0}")]
    InvalidAnswerTimeout(u64),

    #[error("Location timeout must be at most 60000 ms, got {0}")]
    InvalidLocationTimeout(u64),

    #[error("Level interval must be between 10 and 5000 ms, got {0}")]
    InvalidLevelInterval(u64),

    #[error("Recognition language cannot be empty")]
    EmptyLanguage,
}
