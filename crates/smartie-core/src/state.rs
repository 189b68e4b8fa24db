//! Session-level state machine.
//!
//! One [`SessionStateCell`] per session holds both the request phase and the
//! voice activity. Every transition goes through a guarded method so that
//! the invariants hold no matter which component drives the change:
//!
//! - at most one answer request in flight,
//! - at most one of capturing / speaking (the voice enum has no variant for both),
//! - capture and an answer request never overlap.
//!
//! ```text
//!   request:  Idle ──begin_request──▶ InFlight ──finish_request──▶ Idle
//!
//!   voice:    Idle ──begin_capture──▶ Capturing ──finish_capture──▶ Idle
//!             Idle ──begin_speaking(i)──▶ Speaking(i) ──finish_speaking──▶ Idle
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use thiserror::Error;

/// Whether an answer request is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPhase {
    #[default]
    Idle,
    InFlight,
}

/// What the voice hardware is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VoiceActivity {
    #[default]
    Idle,
    Capturing,
    /// Playing the synthesized reading of the transcript entry at `message`.
    Speaking { message: usize },
}

/// Snapshot of the whole session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SessionState {
    pub request: RequestPhase,
    pub voice: VoiceActivity,
}

impl SessionState {
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self.request, RequestPhase::InFlight)
    }

    #[must_use]
    pub const fn is_capturing(&self) -> bool {
        matches!(self.voice, VoiceActivity::Capturing)
    }

    #[must_use]
    pub const fn speaking(&self) -> Option<usize> {
        match self.voice {
            VoiceActivity::Speaking { message } => Some(message),
            _ => None,
        }
    }
}

/// A transition the current state does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("An answer request is already in flight")]
    RequestInFlight,

    #[error("Capture is already active")]
    AlreadyCapturing,

    #[error("Playback of message {message} is active")]
    Speaking { message: usize },

    #[error("Capture is active")]
    Capturing,
}

/// Shared, guarded session state.
///
/// Cloning yields another handle to the same state.
#[derive(Debug, Clone, Default)]
pub struct SessionStateCell {
    inner: Arc<Mutex<SessionState>>,
}

impl SessionStateCell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        *self.lock()
    }

    // ── Request phase ──────────────────────────────────────────────

    /// Mark a request in flight. Fails if one already is or capture is active.
    pub fn begin_request(&self) -> Result<(), TransitionError> {
        let mut state = self.lock();
        if state.is_in_flight() {
            return Err(TransitionError::RequestInFlight);
        }
        if state.is_capturing() {
            return Err(TransitionError::Capturing);
        }
        state.request = RequestPhase::InFlight;
        tracing::debug!("Request phase: in flight");
        Ok(())
    }

    pub fn finish_request(&self) {
        self.lock().request = RequestPhase::Idle;
        tracing::debug!("Request phase: idle");
    }

    /// Mark a request in flight and return a guard that clears it on drop.
    pub fn request_guard(&self) -> Result<RequestGuard, TransitionError> {
        self.begin_request()?;
        Ok(RequestGuard { cell: self.clone() })
    }

    // ── Voice activity ─────────────────────────────────────────────

    /// Enter `Capturing`. Only allowed from `Idle` with no request in flight.
    pub fn begin_capture(&self) -> Result<(), TransitionError> {
        let mut state = self.lock();
        match state.voice {
            VoiceActivity::Capturing => return Err(TransitionError::AlreadyCapturing),
            VoiceActivity::Speaking { message } => {
                return Err(TransitionError::Speaking { message });
            }
            VoiceActivity::Idle => {}
        }
        if state.is_in_flight() {
            return Err(TransitionError::RequestInFlight);
        }
        state.voice = VoiceActivity::Capturing;
        tracing::debug!("Voice activity: capturing");
        Ok(())
    }

    /// Leave `Capturing`. Returns whether capture was active.
    pub fn finish_capture(&self) -> bool {
        let mut state = self.lock();
        if state.is_capturing() {
            state.voice = VoiceActivity::Idle;
            tracing::debug!("Voice activity: idle (capture finished)");
            true
        } else {
            false
        }
    }

    /// Enter `Speaking(message)`, replacing any other playback.
    ///
    /// Returns the message that was speaking before, if any.
    pub fn begin_speaking(&self, message: usize) -> Result<Option<usize>, TransitionError> {
        let mut state = self.lock();
        if state.is_capturing() {
            return Err(TransitionError::Capturing);
        }
        let previous = state.speaking();
        state.voice = VoiceActivity::Speaking { message };
        tracing::debug!(message, "Voice activity: speaking");
        Ok(previous)
    }

    /// Leave `Speaking`. Returns whether playback was active.
    pub fn finish_speaking(&self) -> bool {
        let mut state = self.lock();
        if state.speaking().is_some() {
            state.voice = VoiceActivity::Idle;
            tracing::debug!("Voice activity: idle (playback finished)");
            true
        } else {
            false
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // Plain `Copy` data: a poisoned lock still holds a consistent value.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Clears the in-flight flag when dropped.
#[derive(Debug)]
pub struct RequestGuard {
    cell: SessionStateCell,
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.cell.finish_request();
    }
}
