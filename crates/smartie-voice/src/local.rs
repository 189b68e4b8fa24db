//! Local speaker output via `rodio`.
//!
//! `rodio::OutputStream` is `!Send` on some platforms, so it lives on a
//! dedicated thread for the lifetime of the [`RodioOutput`]. Only the
//! `Send + Sync` stream handle crosses back to the caller.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::audio_io::{AudioOutput, PlaybackDone, PlaybackHandle};
use crate::backend::SynthesizedAudio;
use crate::error::VoiceError;

/// Plays synthesized clips on the default output device.
pub struct RodioOutput {
    handle: OutputStreamHandle,
    shutdown: Option<mpsc::Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl RodioOutput {
    /// Open the default output device.
    pub fn open_default() -> Result<Self, VoiceError> {
        let (init_tx, init_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let thread = thread::Builder::new()
            .name("smartie-audio-out".into())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    let _ = init_tx.send(Ok(handle));
                    // Park until the owner goes away; the stream must outlive every sink.
                    let _ = shutdown_rx.recv();
                    drop(stream);
                }
                Err(e) => {
                    let _ = init_tx.send(Err(VoiceError::DeviceUnavailable(e.to_string())));
                }
            })
            .map_err(|e| VoiceError::DeviceUnavailable(format!("failed to spawn audio thread: {e}")))?;

        let handle = init_rx
            .recv()
            .map_err(|_| VoiceError::DeviceUnavailable("audio thread exited".to_string()))??;

        tracing::info!("Audio playback initialized on default output device");
        Ok(Self {
            handle,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }
}

impl AudioOutput for RodioOutput {
    fn play(
        &self,
        audio: SynthesizedAudio,
        on_done: PlaybackDone,
    ) -> Result<Box<dyn PlaybackHandle>, VoiceError> {
        let content_type = audio.content_type;
        let source = Decoder::new(Cursor::new(audio.bytes)).map_err(|e| {
            VoiceError::PlaybackFailed(format!("cannot decode {content_type}: {e}"))
        })?;
        let sink = Sink::try_new(&self.handle)
            .map_err(|e| VoiceError::PlaybackFailed(e.to_string()))?;
        sink.append(source);

        let sink = Arc::new(sink);
        let stopped = Arc::new(AtomicBool::new(false));

        // `sleep_until_end` returns early once `stop` drops the queued sources.
        let watcher_sink = Arc::clone(&sink);
        let watcher_stopped = Arc::clone(&stopped);
        thread::spawn(move || {
            watcher_sink.sleep_until_end();
            if !watcher_stopped.load(Ordering::SeqCst) {
                tracing::debug!("Playback finished naturally");
                on_done(Ok(()));
            }
        });

        tracing::debug!(%content_type, "Audio playback started");
        Ok(Box::new(RodioPlayback { sink, stopped }))
    }
}

impl Drop for RodioOutput {
    fn drop(&mut self) {
        drop(self.shutdown.take());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

struct RodioPlayback {
    sink: Arc<Sink>,
    stopped: Arc<AtomicBool>,
}

impl PlaybackHandle for RodioPlayback {
    fn stop(&mut self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            self.sink.stop();
            tracing::debug!("Audio playback stopped");
        }
    }
}
