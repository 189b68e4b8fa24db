//! Speech capture controller.
//!
//! Wraps one continuous recognition session at a time. While listening the
//! controller owns a [`MicrophoneLease`], a recognition control handle, and
//! two background tasks: a pump that turns [`RecognitionEvent`]s into
//! [`CaptureEvent`]s and a sampler that reports the microphone level.
//!
//! ```text
//!   Idle ──start──▶ Listening ──final / end / error / stop──▶ Idle
//! ```
//!
//! Every listening cycle gets a generation number. Background tasks carry the
//! generation they were spawned for and go quiet once it is no longer
//! current, so a late event from an old recognition session never touches a
//! newer one.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde::Serialize;
use smartie_core::{EventBus, SessionConfig, SessionStateCell, Subscription, TransitionError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::backend::{RecognitionControl, RecognitionEvent, RecognitionOptions, SpeechRecognizer};
use crate::error::VoiceError;
use crate::guard::{MicrophoneLease, ResourceGuard};

// ── Events ─────────────────────────────────────────────────────────

/// Why a listening cycle ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// A final transcript was recognised.
    Completed,
    /// The recognition session ended on its own.
    Ended,
    /// [`SpeechCapture::stop`] was called.
    Requested,
}

/// Events emitted by the capture controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CaptureEvent {
    Started,
    /// Interim transcript; replaces the previous interim text.
    TranscriptFragment(String),
    /// Final transcript. Always preceded by `Stopped(Completed)`.
    TranscriptFinal(String),
    /// Normalised microphone level (0.0–1.0).
    AudioLevel(f32),
    Stopped(StopReason),
    Error(String),
}

// ── Configuration ──────────────────────────────────────────────────

/// Shortest level sampling period; smaller values are raised to it.
pub const MIN_LEVEL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    pub language: String,
    pub level_interval: Duration,
}

impl CaptureConfig {
    pub fn from_session(config: &SessionConfig) -> Self {
        Self {
            language: config.recognition_language.clone(),
            level_interval: config.level_interval(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::from_session(&SessionConfig::default())
    }
}

// ── Controller ─────────────────────────────────────────────────────

struct ActiveCapture {
    generation: u64,
    lease: MicrophoneLease,
    control: Box<dyn RecognitionControl>,
    tasks: Vec<JoinHandle<()>>,
}

#[derive(Default)]
struct CaptureSlot {
    generation: u64,
    active: Option<ActiveCapture>,
    interim: String,
}

impl CaptureSlot {
    fn is_current(&self, generation: u64) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.generation == generation)
    }
}

struct CaptureInner {
    guard: ResourceGuard,
    recognizer: Arc<dyn SpeechRecognizer>,
    state: SessionStateCell,
    events: EventBus<CaptureEvent>,
    config: CaptureConfig,
    slot: Mutex<CaptureSlot>,
}

/// Speech capture controller.
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct SpeechCapture {
    inner: Arc<CaptureInner>,
}

impl SpeechCapture {
    pub fn new(
        guard: ResourceGuard,
        recognizer: Arc<dyn SpeechRecognizer>,
        state: SessionStateCell,
        mut config: CaptureConfig,
    ) -> Self {
        if config.level_interval < MIN_LEVEL_INTERVAL {
            tracing::debug!(
                requested_ms = config.level_interval.as_millis(),
                "Level interval raised to the minimum"
            );
            config.level_interval = MIN_LEVEL_INTERVAL;
        }
        Self {
            inner: Arc::new(CaptureInner {
                guard,
                recognizer,
                state,
                events: EventBus::new(),
                config,
                slot: Mutex::new(CaptureSlot::default()),
            }),
        }
    }

    /// Start listening.
    ///
    /// Must be called from within a Tokio runtime; the recognition pump and
    /// level sampler run as tasks on it.
    pub fn start(&self) -> Result<(), VoiceError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| VoiceError::RecognitionError(e.to_string()))?;

        let inner = &self.inner;
        let mut slot = inner.lock_slot();

        inner.state.begin_capture().map_err(|e| match e {
            TransitionError::RequestInFlight => VoiceError::CaptureThinking,
            TransitionError::Speaking { .. } => VoiceError::PlaybackActive,
            TransitionError::AlreadyCapturing | TransitionError::Capturing => {
                VoiceError::AlreadyListening
            }
        })?;

        let lease = match inner.guard.acquire_microphone() {
            Ok(lease) => lease,
            Err(e) => {
                inner.state.finish_capture();
                tracing::warn!(error = %e, "Microphone unavailable");
                return Err(e);
            }
        };

        let options = RecognitionOptions::continuous(inner.config.language.clone());
        let session = match inner.recognizer.start(&options) {
            Ok(session) => session,
            Err(e) => {
                inner.guard.release(&lease);
                inner.state.finish_capture();
                tracing::warn!(error = %e, "Speech recognition failed to start");
                return Err(match e {
                    VoiceError::PermissionDenied | VoiceError::RecognitionError(_) => e,
                    other => VoiceError::RecognitionError(other.to_string()),
                });
            }
        };

        slot.generation += 1;
        let generation = slot.generation;
        let weak = Arc::downgrade(inner);
        let tasks = vec![
            runtime.spawn(pump(weak.clone(), generation, session.events)),
            runtime.spawn(sample_levels(weak, generation, inner.config.level_interval)),
        ];

        slot.interim.clear();
        slot.active = Some(ActiveCapture {
            generation,
            lease,
            control: session.control,
            tasks,
        });

        tracing::info!(generation, language = %inner.config.language, "Listening started");
        inner.events.emit(CaptureEvent::Started);
        Ok(())
    }

    /// Stop listening. Returns whether capture was active.
    pub fn stop(&self) -> bool {
        let mut slot = self.inner.lock_slot();
        if self.inner.teardown(&mut slot) {
            tracing::info!("Listening stopped on request");
            self.inner
                .events
                .emit(CaptureEvent::Stopped(StopReason::Requested));
            true
        } else {
            false
        }
    }

    pub fn is_listening(&self) -> bool {
        self.inner.lock_slot().active.is_some()
    }

    /// Current interim transcript; empty when idle.
    pub fn interim(&self) -> String {
        self.inner.lock_slot().interim.clone()
    }

    pub fn subscribe(&self) -> Subscription<CaptureEvent> {
        self.inner.events.subscribe()
    }
}

impl CaptureInner {
    fn lock_slot(&self) -> MutexGuard<'_, CaptureSlot> {
        self.slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock_slot().is_current(generation)
    }

    /// Apply one recognition event. Returns whether the pump should continue.
    fn handle_recognition(&self, generation: u64, event: RecognitionEvent) -> bool {
        let mut slot = self.lock_slot();
        if !slot.is_current(generation) {
            return false;
        }

        match event {
            RecognitionEvent::Fragment {
                text,
                is_final: false,
            } => {
                slot.interim.clone_from(&text);
                self.events.emit(CaptureEvent::TranscriptFragment(text));
                true
            }
            RecognitionEvent::Fragment {
                text,
                is_final: true,
            } => {
                let text = text.trim();
                if text.is_empty() {
                    tracing::debug!("Ignoring empty final transcript");
                    return true;
                }
                self.teardown(&mut slot);
                tracing::info!(chars = text.len(), "Final transcript recognised");
                self.events
                    .emit(CaptureEvent::Stopped(StopReason::Completed));
                self.events
                    .emit(CaptureEvent::TranscriptFinal(text.to_string()));
                false
            }
            RecognitionEvent::Error(reason) => {
                self.teardown(&mut slot);
                tracing::warn!(%reason, "Speech recognition error");
                self.events.emit(CaptureEvent::Error(reason));
                false
            }
            RecognitionEvent::End => {
                self.end_of_session(&mut slot);
                false
            }
        }
    }

    fn end_of_session(&self, slot: &mut CaptureSlot) {
        if self.teardown(slot) {
            tracing::info!("Recognition session ended");
            self.events.emit(CaptureEvent::Stopped(StopReason::Ended));
        }
    }

    /// Release everything the active cycle holds. Returns whether one was active.
    fn teardown(&self, slot: &mut CaptureSlot) -> bool {
        slot.interim.clear();
        let Some(active) = slot.active.take() else {
            return false;
        };
        release_active(active, &self.guard, &self.state);
        true
    }
}

impl Drop for CaptureInner {
    fn drop(&mut self) {
        let active = self
            .slot
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .active
            .take();
        if let Some(active) = active {
            release_active(active, &self.guard, &self.state);
        }
    }
}

fn release_active(mut active: ActiveCapture, guard: &ResourceGuard, state: &SessionStateCell) {
    active.control.stop();
    for task in &active.tasks {
        task.abort();
    }
    guard.release(&active.lease);
    state.finish_capture();
    tracing::debug!(generation = active.generation, "Capture resources released");
}

// ── Background tasks ───────────────────────────────────────────────

async fn pump(
    weak: Weak<CaptureInner>,
    generation: u64,
    mut events: mpsc::UnboundedReceiver<RecognitionEvent>,
) {
    while let Some(event) = events.recv().await {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        if !inner.handle_recognition(generation, event) {
            return;
        }
    }

    // Stream closed without an explicit end: treat it as one.
    if let Some(inner) = weak.upgrade() {
        let mut slot = inner.lock_slot();
        if slot.is_current(generation) {
            inner.end_of_session(&mut slot);
        }
    }
}

async fn sample_levels(weak: Weak<CaptureInner>, generation: u64, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let Some(inner) = weak.upgrade() else {
            return;
        };
        if !inner.is_current(generation) {
            return;
        }
        if let Some(level) = inner.guard.sample_level() {
            inner.events.emit(CaptureEvent::AudioLevel(level));
        }
    }
}
