//! Session error types.

use smartie_core::{ConfigError, ProfileError};
use smartie_voice::VoiceError;

/// Errors returned by session operations.
///
/// `submit` never fails: answer-service failures become the failure chat
/// message instead.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid session configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Voice(#[from] VoiceError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// The entry does not exist, is not a bot answer, or has nothing to say.
    #[error("Message {0} cannot be spoken")]
    NotSpeakable(usize),
}
