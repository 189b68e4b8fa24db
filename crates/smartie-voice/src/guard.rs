//! Resource guard - single ownership of the microphone and its analyser.
//!
//! At most one microphone stream and one analysis graph are live at a time.
//! Acquisition hands out a [`MicrophoneLease`]; the stream is torn down when
//! the lease is released or dropped, whichever comes first. Leases carry the
//! id of the acquisition they came from, so a stale lease never releases a
//! newer acquisition.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::audio_io::{AudioInput, AudioTrack, LevelAnalyser};
use crate::error::VoiceError;

struct HeldAudio {
    id: u64,
    track: Box<dyn AudioTrack>,
    analyser: Option<Box<dyn LevelAnalyser>>,
}

impl HeldAudio {
    fn teardown(mut self) {
        if let Some(mut analyser) = self.analyser.take() {
            analyser.disconnect();
        }
        self.track.stop();
        tracing::info!(lease = self.id, "Microphone released");
    }
}

struct GuardInner {
    input: Arc<dyn AudioInput>,
    held: Mutex<Option<HeldAudio>>,
    next_id: AtomicU64,
}

impl GuardInner {
    fn lock(&self) -> MutexGuard<'_, Option<HeldAudio>> {
        self.held
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn release_id(&self, id: u64) -> bool {
        let taken = {
            let mut held = self.lock();
            match held.as_ref() {
                Some(h) if h.id == id => held.take(),
                _ => None,
            }
        };
        taken.map(HeldAudio::teardown).is_some()
    }
}

impl Drop for GuardInner {
    fn drop(&mut self) {
        let held = self
            .held
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(held) = held {
            held.teardown();
        }
    }
}

/// Owner of the microphone stream and level analyser.
///
/// Cloning yields another handle to the same guard.
#[derive(Clone)]
pub struct ResourceGuard {
    inner: Arc<GuardInner>,
}

impl ResourceGuard {
    pub fn new(input: Arc<dyn AudioInput>) -> Self {
        Self {
            inner: Arc::new(GuardInner {
                input,
                held: Mutex::new(None),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Open the microphone and attach a level analyser.
    ///
    /// The analyser is best-effort: if it cannot be created the microphone is
    /// still granted and [`sample_level`](Self::sample_level) returns `None`.
    pub fn acquire_microphone(&self) -> Result<MicrophoneLease, VoiceError> {
        let mut held = self.inner.lock();
        if held.is_some() {
            return Err(VoiceError::AlreadyAcquired);
        }

        let track = self.inner.input.open_microphone()?;
        let analyser = match self.inner.input.create_analyser(track.as_ref()) {
            Ok(analyser) => Some(analyser),
            Err(e) => {
                tracing::debug!(error = %e, "Level analyser unavailable, continuing without it");
                None
            }
        };

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        *held = Some(HeldAudio {
            id,
            track,
            analyser,
        });
        tracing::info!(lease = id, "Microphone acquired");

        Ok(MicrophoneLease {
            id,
            guard: Arc::downgrade(&self.inner),
        })
    }

    /// Release the acquisition `lease` came from.
    ///
    /// Returns `false` if it was already released or has been superseded.
    pub fn release(&self, lease: &MicrophoneLease) -> bool {
        self.inner.release_id(lease.id)
    }

    /// Release whatever is held. Returns whether anything was.
    pub fn release_all(&self) -> bool {
        let taken = self.inner.lock().take();
        taken.map(HeldAudio::teardown).is_some()
    }

    pub fn is_held(&self) -> bool {
        self.inner.lock().is_some()
    }

    /// Normalised level (0.0–1.0) of the analyser's latest frame.
    ///
    /// `None` when nothing is held, there is no analyser, or the read fails.
    pub fn sample_level(&self) -> Option<f32> {
        let mut held = self.inner.lock();
        let analyser = held.as_mut()?.analyser.as_mut()?;
        match analyser.read_frame() {
            Ok(frame) => Some(calculate_audio_level(&frame)),
            Err(e) => {
                tracing::trace!(error = %e, "Level sample failed");
                None
            }
        }
    }
}

/// Proof of a live microphone acquisition. Dropping it releases the microphone.
#[must_use = "dropping the lease releases the microphone"]
pub struct MicrophoneLease {
    id: u64,
    guard: Weak<GuardInner>,
}

impl MicrophoneLease {
    pub const fn id(&self) -> u64 {
        self.id
    }
}

impl std::fmt::Debug for MicrophoneLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MicrophoneLease").field("id", &self.id).finish()
    }
}

impl Drop for MicrophoneLease {
    fn drop(&mut self) {
        if let Some(inner) = self.guard.upgrade() {
            inner.release_id(self.id);
        }
    }
}

/// Calculate a normalised audio level (0.0–1.0) from PCM samples.
pub fn calculate_audio_level(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();

    #[allow(clippy::cast_precision_loss)]
    let rms = (sum_sq / samples.len() as f32).sqrt();

    // RMS of 0.3 is already very loud speech.
    (rms / 0.3).min(1.0)
}
