//! Stand-ins for hosts without audio hardware or a speech facility.
//!
//! Each one fails with [`VoiceError::DeviceUnavailable`], so the session
//! keeps working for typed input and reports voice requests as unavailable.

use async_trait::async_trait;

use crate::audio_io::{AudioInput, AudioOutput, AudioTrack, LevelAnalyser, PlaybackDone, PlaybackHandle};
use crate::backend::{
    RecognitionOptions, RecognitionSession, SpeechRecognizer, SpeechSynthesizer, SynthesizedAudio,
};
use crate::error::VoiceError;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoAudioInput;

impl AudioInput for NoAudioInput {
    fn open_microphone(&self) -> Result<Box<dyn AudioTrack>, VoiceError> {
        Err(VoiceError::DeviceUnavailable("no microphone".to_string()))
    }

    fn create_analyser(&self, _track: &dyn AudioTrack) -> Result<Box<dyn LevelAnalyser>, VoiceError> {
        Err(VoiceError::DeviceUnavailable("no audio analysis".to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoRecognizer;

impl SpeechRecognizer for NoRecognizer {
    fn start(&self, _options: &RecognitionOptions) -> Result<RecognitionSession, VoiceError> {
        Err(VoiceError::DeviceUnavailable(
            "speech recognition is not supported here".to_string(),
        ))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoSynthesizer;

#[async_trait]
impl SpeechSynthesizer for NoSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<SynthesizedAudio, VoiceError> {
        Err(VoiceError::DeviceUnavailable(
            "no speech-synthesis service configured".to_string(),
        ))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoAudioOutput;

impl AudioOutput for NoAudioOutput {
    fn play(
        &self,
        _audio: SynthesizedAudio,
        _on_done: PlaybackDone,
    ) -> Result<Box<dyn PlaybackHandle>, VoiceError> {
        Err(VoiceError::DeviceUnavailable("no audio output".to_string()))
    }
}
