//! The external collaborators a session is composed from.

use std::sync::Arc;

use smartie_core::{AnswerService, KeyValueStore, LocationProvider};
use smartie_voice::{
    AudioInput, AudioOutput, NoAudioInput, NoAudioOutput, NoRecognizer, NoSynthesizer,
    SpeechRecognizer, SpeechSynthesizer,
};

/// Every port a [`Session`](crate::Session) depends on.
#[derive(Clone)]
pub struct SessionServices {
    pub answers: Arc<dyn AnswerService>,
    pub storage: Arc<dyn KeyValueStore>,
    /// Optional; the session omits coordinates when absent.
    pub location: Option<Arc<dyn LocationProvider>>,
    pub audio_input: Arc<dyn AudioInput>,
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub audio_output: Arc<dyn AudioOutput>,
}

impl SessionServices {
    /// Services for a session without any voice facility.
    pub fn text_only(answers: Arc<dyn AnswerService>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            answers,
            storage,
            location: None,
            audio_input: Arc::new(NoAudioInput),
            recognizer: Arc::new(NoRecognizer),
            synthesizer: Arc::new(NoSynthesizer),
            audio_output: Arc::new(NoAudioOutput),
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: Arc<dyn LocationProvider>) -> Self {
        self.location = Some(location);
        self
    }

    /// Enable spoken input.
    #[must_use]
    pub fn with_capture(
        mut self,
        audio_input: Arc<dyn AudioInput>,
        recognizer: Arc<dyn SpeechRecognizer>,
    ) -> Self {
        self.audio_input = audio_input;
        self.recognizer = recognizer;
        self
    }

    /// Enable spoken replies.
    #[must_use]
    pub fn with_playback(
        mut self,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        audio_output: Arc<dyn AudioOutput>,
    ) -> Self {
        self.synthesizer = synthesizer;
        self.audio_output = audio_output;
        self
    }
}
