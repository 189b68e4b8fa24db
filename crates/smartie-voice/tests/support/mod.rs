//! Test doubles for the voice facilities.
//!
//! No audio hardware or network access is required: the recognizer is
//! driven by the test through a channel, the synthesizer returns canned
//! clips, and the output records what it was asked to play.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use smartie_voice::{
    AudioInput, AudioOutput, AudioTrack, LevelAnalyser, PlaybackDone, PlaybackHandle,
    RecognitionControl, RecognitionEvent, RecognitionOptions, RecognitionSession,
    SpeechRecognizer, SpeechSynthesizer, SynthesizedAudio, VoiceError,
};
use tokio::sync::{Notify, mpsc};

// ── Microphone ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct MicCounters {
    pub opened: AtomicUsize,
    pub stopped: AtomicUsize,
}

pub struct FakeMicrophone {
    pub counters: Arc<MicCounters>,
    pub level_frame: Vec<f32>,
}

impl FakeMicrophone {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            counters: Arc::new(MicCounters::default()),
            level_frame: vec![0.15; 128],
        })
    }

    pub fn open_tracks(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst) - self.counters.stopped.load(Ordering::SeqCst)
    }
}

struct FakeTrack(Arc<MicCounters>);

impl AudioTrack for FakeTrack {
    fn stop(&mut self) {
        self.0.stopped.fetch_add(1, Ordering::SeqCst);
    }
}

struct FakeAnalyser(Vec<f32>);

impl LevelAnalyser for FakeAnalyser {
    fn read_frame(&mut self) -> Result<Vec<f32>, VoiceError> {
        Ok(self.0.clone())
    }

    fn disconnect(&mut self) {}
}

impl AudioInput for FakeMicrophone {
    fn open_microphone(&self) -> Result<Box<dyn AudioTrack>, VoiceError> {
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeTrack(self.counters.clone())))
    }

    fn create_analyser(&self, _track: &dyn AudioTrack) -> Result<Box<dyn LevelAnalyser>, VoiceError> {
        Ok(Box::new(FakeAnalyser(self.level_frame.clone())))
    }
}

// ── Recognition ────────────────────────────────────────────────────

/// A recognizer whose events are pushed by the test.
#[derive(Default)]
pub struct ScriptedRecognizer {
    sender: Mutex<Option<mpsc::UnboundedSender<RecognitionEvent>>>,
    pub stops: Arc<AtomicUsize>,
    pub fail_start: AtomicBool,
    pub starts: AtomicUsize,
}

struct ScriptedControl(Arc<AtomicUsize>);

impl RecognitionControl for ScriptedControl {
    fn stop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl ScriptedRecognizer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Push an event into the most recent session.
    pub fn push(&self, event: RecognitionEvent) {
        let sender = self.sender.lock().unwrap();
        sender
            .as_ref()
            .expect("recognition session started")
            .send(event)
            .expect("session receiver alive");
    }

    pub fn interim(&self, text: &str) {
        self.push(RecognitionEvent::Fragment {
            text: text.to_string(),
            is_final: false,
        });
    }

    pub fn final_text(&self, text: &str) {
        self.push(RecognitionEvent::Fragment {
            text: text.to_string(),
            is_final: true,
        });
    }

    /// Drop the sender, closing the event stream.
    pub fn close(&self) {
        self.sender.lock().unwrap().take();
    }
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn start(&self, options: &RecognitionOptions) -> Result<RecognitionSession, VoiceError> {
        assert!(options.continuous && options.interim_results);
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(VoiceError::RecognitionError("not allowed".to_string()));
        }
        self.starts.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        *self.sender.lock().unwrap() = Some(tx);
        Ok(RecognitionSession {
            events: rx,
            control: Box::new(ScriptedControl(self.stops.clone())),
        })
    }
}

// ── Synthesis ──────────────────────────────────────────────────────

/// Returns a short clip for any text. Can be made to fail or to hold each
/// request until released.
#[derive(Default)]
pub struct CannedSynthesizer {
    pub fail: AtomicBool,
    pub hold: AtomicBool,
    pub release: Notify,
    pub requests: Mutex<Vec<String>>,
}

impl CannedSynthesizer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn holding() -> Arc<Self> {
        let synth = Self::default();
        synth.hold.store(true, Ordering::SeqCst);
        Arc::new(synth)
    }
}

#[async_trait]
impl SpeechSynthesizer for CannedSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, VoiceError> {
        self.requests.lock().unwrap().push(text.to_string());
        if self.hold.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(VoiceError::SynthesisError("service returned 500".to_string()));
        }
        Ok(SynthesizedAudio {
            bytes: text.as_bytes().to_vec(),
            content_type: "audio/mpeg".to_string(),
        })
    }
}

// ── Output ─────────────────────────────────────────────────────────

struct Playing {
    text: String,
    on_done: Option<PlaybackDone>,
    stopped: Arc<AtomicBool>,
}

/// Records every clip and lets the test finish playback.
#[derive(Default)]
pub struct RecordingOutput {
    playing: Mutex<Vec<Playing>>,
}

struct RecordingHandle(Arc<AtomicBool>);

impl PlaybackHandle for RecordingHandle {
    fn stop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl RecordingOutput {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn played(&self) -> Vec<String> {
        self.playing
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.text.clone())
            .collect()
    }

    /// Whether clip `n` (in play order) was stopped.
    pub fn was_stopped(&self, n: usize) -> bool {
        self.playing.lock().unwrap()[n].stopped.load(Ordering::SeqCst)
    }

    /// Report completion of clip `n`.
    pub fn finish(&self, n: usize, result: Result<(), VoiceError>) {
        let on_done = self.playing.lock().unwrap()[n]
            .on_done
            .take()
            .expect("clip not finished yet");
        on_done(result);
    }
}

impl AudioOutput for RecordingOutput {
    fn play(
        &self,
        audio: SynthesizedAudio,
        on_done: PlaybackDone,
    ) -> Result<Box<dyn PlaybackHandle>, VoiceError> {
        let stopped = Arc::new(AtomicBool::new(false));
        self.playing.lock().unwrap().push(Playing {
            text: String::from_utf8(audio.bytes).unwrap(),
            on_done: Some(on_done),
            stopped: stopped.clone(),
        });
        Ok(Box::new(RecordingHandle(stopped)))
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Wait for the next event, failing the test after one second.
pub async fn next<E>(sub: &mut smartie_core::Subscription<E>) -> E {
    tokio::time::timeout(Duration::from_secs(1), sub.recv())
        .await
        .expect("event within timeout")
        .expect("bus alive")
}
