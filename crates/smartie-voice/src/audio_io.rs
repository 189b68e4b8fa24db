//! Audio capture, analysis and output facilities.
//!
//! These traits decouple the controllers from any specific audio backend:
//!
//! | Implementor | Where used |
//! |---|---|
//! | `RodioOutput` (feature `local-playback`) | CLI on a machine with speakers |
//! | [`NoAudioInput`](crate::unavailable::NoAudioInput) / [`NoAudioOutput`](crate::unavailable::NoAudioOutput) | Hosts without audio hardware |
//! | Test doubles | Integration tests |
//!
//! All traits are object-safe. Handles take `&mut self` because each one is
//! owned by exactly one controller.

use crate::backend::SynthesizedAudio;
use crate::error::VoiceError;

// ── Input ──────────────────────────────────────────────────────────

/// An open microphone stream.
pub trait AudioTrack: Send {
    /// Close the stream. Must be safe to call more than once.
    fn stop(&mut self);
}

/// An analysis graph attached to a microphone stream.
pub trait LevelAnalyser: Send {
    /// Read the latest frame of time-domain samples in `-1.0..=1.0`.
    fn read_frame(&mut self) -> Result<Vec<f32>, VoiceError>;

    /// Detach from the stream. Must be safe to call more than once.
    fn disconnect(&mut self);
}

/// Port for microphone access.
pub trait AudioInput: Send + Sync {
    /// Open the default microphone.
    ///
    /// Fails with [`VoiceError::DeviceUnavailable`] when there is no device and
    /// [`VoiceError::PermissionDenied`] when access is refused.
    fn open_microphone(&self) -> Result<Box<dyn AudioTrack>, VoiceError>;

    /// Attach a level analyser to an open track.
    fn create_analyser(&self, track: &dyn AudioTrack) -> Result<Box<dyn LevelAnalyser>, VoiceError>;
}

// ── Output ─────────────────────────────────────────────────────────

/// Callback invoked once when playback ends on its own.
///
/// Receives `Ok(())` on natural completion or the playback error. It is not
/// required to fire after [`PlaybackHandle::stop`].
pub type PlaybackDone = Box<dyn FnOnce(Result<(), VoiceError>) + Send + 'static>;

/// A clip that is currently playing.
pub trait PlaybackHandle: Send {
    /// Stop playing and release the output. Must be safe to call more than once.
    fn stop(&mut self);
}

/// Port for the audio output device.
pub trait AudioOutput: Send + Sync {
    /// Start playing `audio`. `on_done` fires when it finishes.
    fn play(
        &self,
        audio: SynthesizedAudio,
        on_done: PlaybackDone,
    ) -> Result<Box<dyn PlaybackHandle>, VoiceError>;
}
