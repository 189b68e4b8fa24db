#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod audio_io;
pub mod backend;
pub mod capture;
pub mod error;
pub mod guard;
#[cfg(feature = "local-playback")]
pub mod local;
pub mod playback;
pub mod speech_text;
pub mod unavailable;

// Re-export key types for convenience
pub use audio_io::{AudioInput, AudioOutput, AudioTrack, LevelAnalyser, PlaybackDone, PlaybackHandle};
pub use backend::{
    RecognitionControl, RecognitionEvent, RecognitionOptions, RecognitionSession,
    SpeechRecognizer, SpeechSynthesizer, SynthesizedAudio,
};
pub use capture::{CaptureConfig, CaptureEvent, MIN_LEVEL_INTERVAL, SpeechCapture, StopReason};
pub use error::VoiceError;
pub use guard::{MicrophoneLease, ResourceGuard, calculate_audio_level};
#[cfg(feature = "local-playback")]
pub use local::RodioOutput;
pub use playback::{PlaybackEvent, SpeakOutcome, SpeechPlayback};
pub use speech_text::prepare_for_speech;
pub use unavailable::{NoAudioInput, NoAudioOutput, NoRecognizer, NoSynthesizer};
