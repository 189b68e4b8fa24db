//! The session orchestrator.
//!
//! A [`Session`] owns one transcript, one profile, and the two voice
//! controllers, and is the only place where they are coordinated. Typed and
//! spoken questions enter through the same [`Session::submit`] pipeline.
//!
//! # Locking discipline
//!
//! All shared state sits behind `std::sync::Mutex` guards owned by the
//! components themselves. None of them is held across an `.await`: the
//! answer call, the location lookup, and speech synthesis run with no lock
//! held.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use smartie_core::{
    AnswerError, AnswerRequest, AnswerService, ConversationStore, FontSize, GeoPosition,
    LocationProvider, Message, Origin, Preferences, ProfileService, SessionConfig,
    SessionIdentity, SessionState, SessionStateCell, Subscription, Theme, TranscriptEvent,
    WindowSize,
};
use smartie_voice::{
    CaptureConfig, CaptureEvent, PlaybackEvent, ResourceGuard, SpeakOutcome, SpeechCapture,
    SpeechPlayback,
};
use tokio::task::JoinHandle;

use crate::error::SessionError;
use crate::services::SessionServices;

// ── Submit types ───────────────────────────────────────────────────

/// Why a submission was not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// The text was empty after trimming.
    Blank,
    /// Another answer request is in flight.
    Busy,
}

/// What a submission did to the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Ignored { reason: IgnoreReason },
    /// The placeholder at `index` now holds the answer.
    Answered { index: usize },
    /// The placeholder at `index` now holds the failure text.
    Failed { index: usize },
    /// The transcript was cleared while the answer was outstanding.
    Discarded,
}

/// Per-call submission options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubmitOptions {
    pub origin: Origin,
    /// Speak the reply. `None` uses the configured default for `origin`.
    pub speak_reply: Option<bool>,
}

impl SubmitOptions {
    pub const fn typed() -> Self {
        Self {
            origin: Origin::Typed,
            speak_reply: None,
        }
    }

    pub const fn voice() -> Self {
        Self {
            origin: Origin::Voice,
            speak_reply: None,
        }
    }

    #[must_use]
    pub const fn speak_reply(mut self, speak: bool) -> Self {
        self.speak_reply = Some(speak);
        self
    }
}

// ── Session ────────────────────────────────────────────────────────

/// One active conversation session.
pub struct Session {
    config: SessionConfig,
    state: SessionStateCell,
    store: ConversationStore,
    profile: ProfileService,
    answers: Arc<dyn AnswerService>,
    location: Option<Arc<dyn LocationProvider>>,
    guard: ResourceGuard,
    capture: SpeechCapture,
    playback: SpeechPlayback,
    bridge: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Validate `config`, open the persisted state, and wire the controllers.
    pub fn new(config: SessionConfig, services: SessionServices) -> Result<Arc<Self>, SessionError> {
        config.validate()?;

        let state = SessionStateCell::new();
        let store = ConversationStore::open(services.storage.clone(), config.transcript_policy);
        let profile = ProfileService::open(services.storage);
        let guard = ResourceGuard::new(services.audio_input);
        let capture = SpeechCapture::new(
            guard.clone(),
            services.recognizer,
            state.clone(),
            CaptureConfig::from_session(&config),
        );
        let playback = SpeechPlayback::new(services.synthesizer, services.audio_output, state.clone());

        tracing::info!(
            policy = ?config.transcript_policy,
            restored = store.len(),
            location = services.location.is_some(),
            "Session opened"
        );

        Ok(Arc::new(Self {
            config,
            state,
            store,
            profile,
            answers: services.answers,
            location: services.location,
            guard,
            capture,
            playback,
            bridge: Mutex::new(None),
        }))
    }

    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    // ── Conversation ───────────────────────────────────────────────

    /// Submit a question with the default options for `origin`.
    pub async fn submit(&self, text: &str, origin: Origin) -> SubmitOutcome {
        self.submit_with(
            text,
            SubmitOptions {
                origin,
                speak_reply: None,
            },
        )
        .await
    }

    /// Run one question/answer turn.
    ///
    /// Appends the user message and a placeholder, asks the answer service,
    /// and resolves the placeholder with the answer or the failure text. Any
    /// active listening cycle is stopped first. The in-flight flag is cleared
    /// before this returns on every path.
    pub async fn submit_with(&self, text: &str, options: SubmitOptions) -> SubmitOutcome {
        let question = text.trim();
        if question.is_empty() {
            return SubmitOutcome::Ignored {
                reason: IgnoreReason::Blank,
            };
        }
        if self.state.snapshot().is_in_flight() {
            tracing::debug!("Submission ignored, a request is already in flight");
            return SubmitOutcome::Ignored {
                reason: IgnoreReason::Busy,
            };
        }
        // Sending ends any listening cycle; the cut-off utterance is reported
        // as `Stopped(Requested)` on the capture stream.
        if self.capture.stop() {
            tracing::info!("Listening ended by a new submission");
        }
        let in_flight = match self.state.request_guard() {
            Ok(guard) => guard,
            Err(e) => {
                tracing::debug!(error = %e, "Submission ignored");
                return SubmitOutcome::Ignored {
                    reason: IgnoreReason::Busy,
                };
            }
        };

        let chat_history = self.store.history(self.config.history_limit);
        self.store.append(Message::user(question, options.origin));
        self.store.append(Message::placeholder());
        tracing::info!(origin = ?options.origin, chars = question.len(), "Question submitted");

        let position = self.locate().await;
        let request = AnswerRequest {
            question: question.to_string(),
            name: self.profile.identity().display_name,
            latitude: position.map(|p| p.latitude),
            longitude: position.map(|p| p.longitude),
            chat_history,
        };

        let result = tokio::time::timeout(self.config.answer_timeout(), self.answers.ask(&request))
            .await
            .unwrap_or(Err(AnswerError::Timeout));

        let (reply, answered) = match result {
            Ok(answer) => {
                tracing::info!(citations = answer.citations.len(), "Answer received");
                (Message::answer(answer.text, answer.citations), true)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Answer service failed");
                (Message::failure(), false)
            }
        };
        let reply_text = reply.text.clone();

        let index = match self.store.resolve_pending(reply) {
            Ok(index) => index,
            Err(e) => {
                tracing::error!(error = %e, "Answer arrived without a pending placeholder");
                return SubmitOutcome::Discarded;
            }
        };
        drop(in_flight);

        if !answered {
            return SubmitOutcome::Failed { index };
        }

        let speak = options
            .speak_reply
            .unwrap_or_else(|| self.auto_speaks(options.origin));
        if speak {
            self.capture.stop();
            if let Err(e) = self.playback.speak(&reply_text, index).await {
                tracing::warn!(index, error = %e, "Could not speak reply");
            }
        }

        SubmitOutcome::Answered { index }
    }

    const fn auto_speaks(&self, origin: Origin) -> bool {
        match origin {
            Origin::Voice => self.config.auto_speak_voice,
            Origin::Typed => self.config.auto_speak_typed,
        }
    }

    async fn locate(&self) -> Option<GeoPosition> {
        let provider = self.location.as_ref()?;
        match tokio::time::timeout(self.config.location_timeout(), provider.current_position()).await
        {
            Ok(Ok(position)) => Some(position),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Location unavailable, asking without it");
                None
            }
            Err(_) => {
                tracing::debug!("Location lookup timed out, asking without it");
                None
            }
        }
    }

    /// Empty the transcript. Identity and preferences are kept.
    pub fn clear_transcript(&self) {
        self.playback.stop();
        self.store.clear();
    }

    pub fn transcript(&self) -> Vec<Message> {
        self.store.snapshot()
    }

    pub fn state(&self) -> SessionState {
        self.state.snapshot()
    }

    pub fn subscribe_transcript(&self) -> Subscription<TranscriptEvent> {
        self.store.subscribe()
    }

    // ── Voice ──────────────────────────────────────────────────────

    /// Stop any reply being spoken and start listening.
    pub fn start_listening(&self) -> Result<(), SessionError> {
        self.playback.stop();
        self.capture.start()?;
        Ok(())
    }

    pub fn stop_listening(&self) -> bool {
        self.capture.stop()
    }

    /// Current interim transcript while listening.
    pub fn interim_transcript(&self) -> String {
        self.capture.interim()
    }

    /// Read the bot answer at `index` aloud, stopping capture first.
    pub async fn speak_message(&self, index: usize) -> Result<SpeakOutcome, SessionError> {
        let message = self
            .store
            .get(index)
            .filter(|m| !m.is_user() && m.speakable && !m.pending)
            .ok_or(SessionError::NotSpeakable(index))?;

        self.capture.stop();
        Ok(self.playback.speak(&message.text, index).await?)
    }

    pub fn stop_speaking(&self) -> bool {
        self.playback.stop()
    }

    pub fn subscribe_capture(&self) -> Subscription<CaptureEvent> {
        self.capture.subscribe()
    }

    pub fn subscribe_playback(&self) -> Subscription<PlaybackEvent> {
        self.playback.subscribe()
    }

    /// Forward every final transcript to [`submit`](Self::submit) as a
    /// spoken question. Replaces any previous bridge. The task ends when the
    /// session is dropped.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_voice_bridge(self: &Arc<Self>) {
        let mut captures = self.capture.subscribe();
        let weak = Arc::downgrade(self);

        let task = tokio::spawn(async move {
            while let Some(event) = captures.recv().await {
                let CaptureEvent::TranscriptFinal(text) = event else {
                    continue;
                };
                let Some(session) = weak.upgrade() else {
                    break;
                };
                match session.submit(&text, Origin::Voice).await {
                    SubmitOutcome::Ignored { reason } => {
                        tracing::warn!(
                            ?reason,
                            chars = text.len(),
                            "Spoken question was not sent"
                        );
                    }
                    outcome => tracing::debug!(?outcome, "Spoken question handled"),
                }
            }
            tracing::debug!("Voice bridge finished");
        });

        if let Some(previous) = self.lock_bridge().replace(task) {
            previous.abort();
        }
    }

    // ── Identity & preferences ─────────────────────────────────────

    pub fn identity(&self) -> SessionIdentity {
        self.profile.identity()
    }

    pub fn rename(&self, name: &str) -> Result<SessionIdentity, SessionError> {
        Ok(self.profile.rename(name)?)
    }

    pub fn set_avatar(&self, avatar: &str) -> Result<SessionIdentity, SessionError> {
        Ok(self.profile.set_avatar(avatar)?)
    }

    pub fn preferences(&self) -> Preferences {
        self.profile.preferences()
    }

    pub fn set_theme(&self, theme: Theme) -> Preferences {
        self.profile.set_theme(theme)
    }

    pub fn set_font_size(&self, font_size: FontSize) -> Preferences {
        self.profile.set_font_size(font_size)
    }

    pub fn set_window_size(&self, window_size: WindowSize) -> Preferences {
        self.profile.set_window_size(window_size)
    }

    // ── Teardown ───────────────────────────────────────────────────

    /// Stop capture and playback and release the microphone.
    pub fn shutdown(&self) {
        if let Some(bridge) = self.lock_bridge().take() {
            bridge.abort();
        }
        self.capture.stop();
        self.playback.stop();
        if self.guard.release_all() {
            tracing::warn!("Microphone was still held at shutdown");
        }
        tracing::info!("Session shut down");
    }

    fn lock_bridge(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.bridge
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}
