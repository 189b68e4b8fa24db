//! Speech recognition and speech synthesis facilities.
//!
//! Both are external collaborators. Recognition is a continuous session that
//! pushes events into a channel until it is stopped or ends on its own.
//! Synthesis turns prepared text into an encoded audio clip.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::VoiceError;

// ── Recognition ────────────────────────────────────────────────────

/// Options for one recognition session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    /// BCP 47 language tag, e.g. `en-US`.
    pub language: String,
    /// Keep recognising across pauses instead of ending after one phrase.
    pub continuous: bool,
    /// Report interim (non-final) fragments.
    pub interim_results: bool,
}

impl RecognitionOptions {
    /// Continuous recognition with interim results.
    pub fn continuous(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            continuous: true,
            interim_results: true,
        }
    }
}

/// An event produced by a running recognition session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// A transcript chunk. Interim chunks may be revised; a final chunk is not.
    Fragment { text: String, is_final: bool },
    /// The session failed. No further events follow.
    Error(String),
    /// The session ended on its own. No further events follow.
    End,
}

/// Stops a running recognition session.
pub trait RecognitionControl: Send {
    /// Stop recognising. Must be safe to call more than once.
    fn stop(&mut self);
}

/// A started recognition session.
pub struct RecognitionSession {
    pub events: mpsc::UnboundedReceiver<RecognitionEvent>,
    pub control: Box<dyn RecognitionControl>,
}

/// Port for the speech recognition facility.
pub trait SpeechRecognizer: Send + Sync {
    fn start(&self, options: &RecognitionOptions) -> Result<RecognitionSession, VoiceError>;
}

// ── Synthesis ──────────────────────────────────────────────────────

/// An encoded audio clip returned by the synthesis service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,
    /// MIME type reported by the service, e.g. `audio/mpeg`.
    pub content_type: String,
}

/// Port for the speech-synthesis service.
///
/// Uses `#[async_trait]` so the session can hold a `dyn SpeechSynthesizer`.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, VoiceError>;
}
