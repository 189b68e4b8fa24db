//! Voice error types.

/// Errors that can occur in voice capture and playback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoiceError {
    /// No usable audio device (or no recognition / synthesis facility).
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Microphone permission denied.
    #[error("Microphone permission denied")]
    PermissionDenied,

    /// The microphone is already held by a live lease.
    #[error("Microphone is already acquired")]
    AlreadyAcquired,

    /// Capture was started while already listening.
    #[error("Already listening")]
    AlreadyListening,

    /// Capture was started while an answer request is outstanding.
    #[error("Cannot listen while an answer is pending")]
    CaptureThinking,

    /// Capture was started while a reply is being spoken.
    #[error("Cannot listen while a reply is playing")]
    PlaybackActive,

    /// Playback was started while the microphone is listening.
    #[error("Cannot speak while listening")]
    CaptureActive,

    /// Speech recognition failed to start or failed mid-session.
    #[error("Speech recognition failed: {0}")]
    RecognitionError(String),

    /// The speech-synthesis service failed.
    #[error("Speech synthesis failed: {0}")]
    SynthesisError(String),

    /// Fetching or playing synthesized audio failed.
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    /// Reading a frame from the level analyser failed.
    #[error("Audio analysis failed: {0}")]
    AnalysisFailed(String),

    /// The operation was superseded before it could take effect.
    #[error("Voice operation cancelled")]
    Cancelled,
}
