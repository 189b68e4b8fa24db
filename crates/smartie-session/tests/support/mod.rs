//! Collaborators for session tests.
//!
//! The answer service is mocked with `mockall`; voice facilities are small
//! hand-written fakes that the tests drive directly.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;
use smartie_core::{
    Answer, AnswerError, AnswerRequest, AnswerService, Citation, MemoryStore, SessionConfig,
    Subscription,
};
use smartie_session::{Session, SessionServices};
use smartie_voice::{
    AudioInput, AudioOutput, AudioTrack, LevelAnalyser, PlaybackDone, PlaybackHandle,
    RecognitionControl, RecognitionEvent, RecognitionOptions, RecognitionSession,
    SpeechRecognizer, SpeechSynthesizer, SynthesizedAudio, VoiceError,
};
use tokio::sync::{Notify, mpsc};

// ── Answer service ─────────────────────────────────────────────────

mock! {
    pub Answers {}

    #[async_trait]
    impl AnswerService for Answers {
        async fn ask(&self, request: &AnswerRequest) -> Result<Answer, AnswerError>;
    }
}

/// A mock that answers every question with `text`.
pub fn answering(text: &'static str) -> MockAnswers {
    let mut answers = MockAnswers::new();
    answers.expect_ask().returning(move |_| {
        Ok(Answer {
            text: text.to_string(),
            citations: Vec::new(),
        })
    });
    answers
}

pub fn store_a_answer() -> Answer {
    Answer {
        text: "Try Store A".to_string(),
        citations: vec![Citation::new("1", "http://a")],
    }
}

/// Holds every request until released, then answers "done".
#[derive(Default)]
pub struct HeldAnswers {
    pub release: Notify,
    pub calls: AtomicUsize,
}

#[async_trait]
impl AnswerService for HeldAnswers {
    async fn ask(&self, _request: &AnswerRequest) -> Result<Answer, AnswerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        Ok(Answer {
            text: "done".to_string(),
            citations: Vec::new(),
        })
    }
}

// ── Voice ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeMicrophone {
    pub open: Arc<AtomicUsize>,
}

struct FakeTrack(Arc<AtomicUsize>);

impl AudioTrack for FakeTrack {
    fn stop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AudioInput for FakeMicrophone {
    fn open_microphone(&self) -> Result<Box<dyn AudioTrack>, VoiceError> {
        self.open.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeTrack(self.open.clone())))
    }

    fn create_analyser(&self, _track: &dyn AudioTrack) -> Result<Box<dyn LevelAnalyser>, VoiceError> {
        Err(VoiceError::AnalysisFailed("not needed".to_string()))
    }
}

#[derive(Default)]
pub struct ScriptedRecognizer {
    sender: Mutex<Option<mpsc::UnboundedSender<RecognitionEvent>>>,
}

struct NoopControl;

impl RecognitionControl for NoopControl {
    fn stop(&mut self) {}
}

impl ScriptedRecognizer {
    pub fn say(&self, text: &str) {
        self.sender
            .lock()
            .unwrap()
            .as_ref()
            .expect("listening")
            .send(RecognitionEvent::Fragment {
                text: text.to_string(),
                is_final: true,
            })
            .expect("session alive");
    }
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn start(&self, _options: &RecognitionOptions) -> Result<RecognitionSession, VoiceError> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.sender.lock().unwrap() = Some(tx);
        Ok(RecognitionSession {
            events: rx,
            control: Box::new(NoopControl),
        })
    }
}

#[derive(Default)]
pub struct EchoSynthesizer {
    pub texts: Mutex<Vec<String>>,
}

#[async_trait]
impl SpeechSynthesizer for EchoSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, VoiceError> {
        self.texts.lock().unwrap().push(text.to_string());
        Ok(SynthesizedAudio {
            bytes: text.as_bytes().to_vec(),
            content_type: "audio/mpeg".to_string(),
        })
    }
}

/// Plays forever until stopped.
#[derive(Default)]
pub struct EndlessOutput {
    pub stopped: Arc<AtomicBool>,
    pub plays: AtomicUsize,
}

struct EndlessHandle(Arc<AtomicBool>);

impl PlaybackHandle for EndlessHandle {
    fn stop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl AudioOutput for EndlessOutput {
    fn play(
        &self,
        _audio: SynthesizedAudio,
        _on_done: PlaybackDone,
    ) -> Result<Box<dyn PlaybackHandle>, VoiceError> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        self.stopped.store(false, Ordering::SeqCst);
        Ok(Box::new(EndlessHandle(self.stopped.clone())))
    }
}

// ── Rig ────────────────────────────────────────────────────────────

pub struct VoiceRig {
    pub session: Arc<Session>,
    pub mic: Arc<FakeMicrophone>,
    pub recognizer: Arc<ScriptedRecognizer>,
    pub synthesizer: Arc<EchoSynthesizer>,
    pub output: Arc<EndlessOutput>,
    pub storage: Arc<MemoryStore>,
}

pub fn text_session(answers: impl AnswerService + 'static) -> Arc<Session> {
    Session::new(
        SessionConfig::default(),
        SessionServices::text_only(Arc::new(answers), Arc::new(MemoryStore::new())),
    )
    .unwrap()
}

pub fn voice_session(answers: Arc<dyn AnswerService>, config: SessionConfig) -> VoiceRig {
    let mic = Arc::new(FakeMicrophone::default());
    let recognizer = Arc::new(ScriptedRecognizer::default());
    let synthesizer = Arc::new(EchoSynthesizer::default());
    let output = Arc::new(EndlessOutput::default());
    let storage = Arc::new(MemoryStore::new());

    let services = SessionServices::text_only(answers, storage.clone())
        .with_capture(mic.clone(), recognizer.clone())
        .with_playback(synthesizer.clone(), output.clone());

    VoiceRig {
        session: Session::new(config, services).unwrap(),
        mic,
        recognizer,
        synthesizer,
        output,
        storage,
    }
}

/// Wait for the next event, failing the test after one second.
pub async fn next<E>(sub: &mut Subscription<E>) -> E {
    tokio::time::timeout(Duration::from_secs(1), sub.recv())
        .await
        .expect("event within timeout")
        .expect("bus alive")
}
