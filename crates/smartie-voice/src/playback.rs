//! Speech playback controller.
//!
//! Reads one transcript entry aloud at a time: prepares the text, fetches
//! synthesized audio, and plays it on the audio output. A new `speak`
//! supersedes whatever came before it, including a fetch that has not
//! returned yet.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde::Serialize;
use smartie_core::{EventBus, SessionStateCell, Subscription};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::audio_io::{AudioOutput, PlaybackDone, PlaybackHandle};
use crate::backend::SpeechSynthesizer;
use crate::error::VoiceError;
use crate::speech_text::prepare_for_speech;

/// Events emitted by the playback controller. `message` is the transcript index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    Started { message: usize },
    /// Playback ran to completion.
    Ended { message: usize },
    /// Playback was interrupted by `stop` or by a newer `speak`.
    Stopped { message: usize },
    Error { message: usize, reason: String },
}

/// Result of a successful [`SpeechPlayback::speak`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// Audio is playing.
    Playing,
    /// The text had nothing speakable in it.
    NothingToSay,
}

struct ActivePlayback {
    message: usize,
    generation: u64,
    handle: Box<dyn PlaybackHandle>,
    watcher: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct PlaybackSlot {
    generation: u64,
    active: Option<ActivePlayback>,
}

struct PlaybackInner {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    output: Arc<dyn AudioOutput>,
    state: SessionStateCell,
    events: EventBus<PlaybackEvent>,
    slot: Mutex<PlaybackSlot>,
}

/// Speech playback controller.
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct SpeechPlayback {
    inner: Arc<PlaybackInner>,
}

impl SpeechPlayback {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        output: Arc<dyn AudioOutput>,
        state: SessionStateCell,
    ) -> Self {
        Self {
            inner: Arc::new(PlaybackInner {
                synthesizer,
                output,
                state,
                events: EventBus::new(),
                slot: Mutex::new(PlaybackSlot::default()),
            }),
        }
    }

    /// Speak `text` as the reading of transcript entry `message`.
    ///
    /// Any active playback is stopped first. Returns [`VoiceError::Cancelled`]
    /// if another `speak` or `stop` happens while the audio is being fetched,
    /// and [`VoiceError::PlaybackFailed`] if fetching or playing fails.
    pub async fn speak(&self, text: &str, message: usize) -> Result<SpeakOutcome, VoiceError> {
        let prepared = prepare_for_speech(text);
        if prepared.is_empty() {
            tracing::debug!(message, "Nothing speakable, skipping playback");
            return Ok(SpeakOutcome::NothingToSay);
        }
        if self.inner.state.snapshot().is_capturing() {
            return Err(VoiceError::CaptureActive);
        }

        let generation = {
            let mut slot = self.inner.lock_slot();
            slot.generation += 1;
            self.inner.stop_active(&mut slot);
            slot.generation
        };

        tracing::debug!(message, chars = prepared.len(), "Fetching synthesized speech");
        let fetched = self.inner.synthesizer.synthesize(&prepared).await;

        let mut slot = self.inner.lock_slot();
        if slot.generation != generation {
            tracing::debug!(message, "Speech superseded during fetch");
            return Err(VoiceError::Cancelled);
        }

        let audio = match fetched {
            Ok(audio) => audio,
            Err(e) => return Err(self.inner.fail(message, &e)),
        };

        if self.inner.state.begin_speaking(message).is_err() {
            self.inner.report(message, VoiceError::CaptureActive.to_string());
            return Err(VoiceError::CaptureActive);
        }

        let (done_tx, done_rx) = oneshot::channel();
        let on_done: PlaybackDone = Box::new(move |result| {
            let _ = done_tx.send(result);
        });

        let handle = match self.inner.output.play(audio, on_done) {
            Ok(handle) => handle,
            Err(e) => {
                self.inner.state.finish_speaking();
                return Err(self.inner.fail(message, &e));
            }
        };

        let watcher = tokio::spawn(watch_completion(
            Arc::downgrade(&self.inner),
            generation,
            done_rx,
        ));
        slot.active = Some(ActivePlayback {
            message,
            generation,
            handle,
            watcher: Some(watcher),
        });

        tracing::info!(message, "Playback started");
        self.inner.events.emit(PlaybackEvent::Started { message });
        Ok(SpeakOutcome::Playing)
    }

    /// Stop playback and supersede any pending fetch. Returns whether
    /// anything was playing.
    pub fn stop(&self) -> bool {
        let mut slot = self.inner.lock_slot();
        slot.generation += 1;
        self.inner.stop_active(&mut slot)
    }

    /// Transcript index currently being spoken.
    pub fn speaking(&self) -> Option<usize> {
        self.inner.lock_slot().active.as_ref().map(|a| a.message)
    }

    pub fn subscribe(&self) -> Subscription<PlaybackEvent> {
        self.inner.events.subscribe()
    }
}

impl PlaybackInner {
    fn lock_slot(&self) -> MutexGuard<'_, PlaybackSlot> {
        self.slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn stop_active(&self, slot: &mut PlaybackSlot) -> bool {
        let Some(active) = slot.active.take() else {
            return false;
        };
        let message = active.message;
        release_active(active, &self.state);
        tracing::info!(message, "Playback stopped");
        self.events.emit(PlaybackEvent::Stopped { message });
        true
    }

    fn fail(&self, message: usize, error: &VoiceError) -> VoiceError {
        let reason = error.to_string();
        self.report(message, reason.clone());
        VoiceError::PlaybackFailed(reason)
    }

    fn report(&self, message: usize, reason: String) {
        tracing::warn!(message, %reason, "Playback failed");
        self.events.emit(PlaybackEvent::Error { message, reason });
    }

    fn finish(&self, generation: u64, result: Result<(), VoiceError>) {
        let mut slot = self.lock_slot();
        if !slot
            .active
            .as_ref()
            .is_some_and(|a| a.generation == generation)
        {
            return;
        }
        let Some(mut active) = slot.active.take() else {
            return;
        };
        // Running inside the watcher; it must not abort itself.
        active.watcher = None;
        let message = active.message;
        release_active(active, &self.state);

        match result {
            Ok(()) => {
                tracing::info!(message, "Playback finished");
                self.events.emit(PlaybackEvent::Ended { message });
            }
            Err(e) => {
                tracing::warn!(message, error = %e, "Playback failed");
                self.events.emit(PlaybackEvent::Error {
                    message,
                    reason: e.to_string(),
                });
            }
        }
    }
}

impl Drop for PlaybackInner {
    fn drop(&mut self) {
        let active = self
            .slot
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .active
            .take();
        if let Some(active) = active {
            release_active(active, &self.state);
        }
    }
}

fn release_active(mut active: ActivePlayback, state: &SessionStateCell) {
    active.handle.stop();
    if let Some(watcher) = active.watcher.take() {
        watcher.abort();
    }
    state.finish_speaking();
}

async fn watch_completion(
    weak: Weak<PlaybackInner>,
    generation: u64,
    done: oneshot::Receiver<Result<(), VoiceError>>,
) {
    // A dropped callback means the output finished without reporting.
    let result = done.await.unwrap_or(Ok(()));
    if let Some(inner) = weak.upgrade() {
        inner.finish(generation, result);
    }
}
