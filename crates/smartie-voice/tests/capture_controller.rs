//! Integration tests for the `SpeechCapture` controller.
//!
//! The recognizer is scripted by each test, so the full listening cycle
//! (start, interim fragments, final transcript, teardown) runs without a
//! microphone or a speech engine.

mod support;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use smartie_core::SessionStateCell;
use smartie_voice::{
    CaptureConfig, CaptureEvent, MIN_LEVEL_INTERVAL, RecognitionEvent, ResourceGuard,
    SpeechCapture, StopReason, VoiceError,
};
use support::{FakeMicrophone, ScriptedRecognizer, next};

struct Rig {
    capture: SpeechCapture,
    state: SessionStateCell,
    guard: ResourceGuard,
    mic: Arc<FakeMicrophone>,
    recognizer: Arc<ScriptedRecognizer>,
}

fn rig() -> Rig {
    let mic = FakeMicrophone::new();
    let recognizer = ScriptedRecognizer::new();
    let state = SessionStateCell::new();
    let guard = ResourceGuard::new(mic.clone());
    let capture = SpeechCapture::new(
        guard.clone(),
        recognizer.clone(),
        state.clone(),
        CaptureConfig {
            language: "en-US".to_string(),
            level_interval: Duration::from_millis(100),
        },
    );
    Rig {
        capture,
        state,
        guard,
        mic,
        recognizer,
    }
}

#[tokio::test]
async fn start_then_stop_releases_everything() {
    let rig = rig();
    let mut events = rig.capture.subscribe();

    rig.capture.start().unwrap();
    assert_eq!(next(&mut events).await, CaptureEvent::Started);
    assert!(rig.state.snapshot().is_capturing());
    assert!(rig.guard.is_held());

    assert!(rig.capture.stop());
    assert_eq!(
        next(&mut events).await,
        CaptureEvent::Stopped(StopReason::Requested)
    );
    assert!(!rig.state.snapshot().is_capturing());
    assert!(!rig.guard.is_held());
    assert_eq!(rig.mic.open_tracks(), 0);
    assert_eq!(rig.recognizer.stops.load(Ordering::SeqCst), 1);

    // Idempotent from Idle.
    assert!(!rig.capture.stop());
}

#[tokio::test]
async fn final_transcript_stops_capture_before_it_is_emitted() {
    let rig = rig();
    let mut events = rig.capture.subscribe();
    rig.capture.start().unwrap();
    assert_eq!(next(&mut events).await, CaptureEvent::Started);

    rig.recognizer.interim("where is");
    assert_eq!(
        next(&mut events).await,
        CaptureEvent::TranscriptFragment("where is".to_string())
    );
    assert_eq!(rig.capture.interim(), "where is");

    rig.recognizer.final_text(" where is the milk ");
    assert_eq!(
        next(&mut events).await,
        CaptureEvent::Stopped(StopReason::Completed)
    );
    assert_eq!(
        next(&mut events).await,
        CaptureEvent::TranscriptFinal("where is the milk".to_string())
    );
    assert!(!rig.state.snapshot().is_capturing());
    assert!(!rig.guard.is_held());
    assert_eq!(rig.capture.interim(), "");
}

#[tokio::test]
async fn empty_final_is_ignored() {
    let rig = rig();
    let mut events = rig.capture.subscribe();
    rig.capture.start().unwrap();
    assert_eq!(next(&mut events).await, CaptureEvent::Started);

    rig.recognizer.final_text("   ");
    rig.recognizer.interim("still here");
    assert_eq!(
        next(&mut events).await,
        CaptureEvent::TranscriptFragment("still here".to_string())
    );
    assert!(rig.capture.is_listening());
}

#[tokio::test]
async fn recognition_error_returns_to_idle() {
    let rig = rig();
    let mut events = rig.capture.subscribe();
    rig.capture.start().unwrap();
    assert_eq!(next(&mut events).await, CaptureEvent::Started);

    rig.recognizer.interim("partial");
    assert!(matches!(
        next(&mut events).await,
        CaptureEvent::TranscriptFragment(_)
    ));
    rig.recognizer
        .push(RecognitionEvent::Error("network".to_string()));
    assert_eq!(
        next(&mut events).await,
        CaptureEvent::Error("network".to_string())
    );
    assert!(!rig.capture.is_listening());
    assert_eq!(rig.capture.interim(), "");
    assert_eq!(rig.mic.open_tracks(), 0);
}

#[tokio::test]
async fn end_of_session_is_an_implicit_stop() {
    let rig = rig();
    let mut events = rig.capture.subscribe();
    rig.capture.start().unwrap();
    assert_eq!(next(&mut events).await, CaptureEvent::Started);

    rig.recognizer.push(RecognitionEvent::End);
    assert_eq!(
        next(&mut events).await,
        CaptureEvent::Stopped(StopReason::Ended)
    );
    assert!(!rig.guard.is_held());
}

#[tokio::test]
async fn closed_stream_is_an_implicit_stop() {
    let rig = rig();
    let mut events = rig.capture.subscribe();
    rig.capture.start().unwrap();
    assert_eq!(next(&mut events).await, CaptureEvent::Started);

    rig.recognizer.close();
    assert_eq!(
        next(&mut events).await,
        CaptureEvent::Stopped(StopReason::Ended)
    );
    assert!(!rig.state.snapshot().is_capturing());
}

#[tokio::test]
async fn start_is_rejected_in_busy_states() {
    let rig = rig();

    rig.capture.start().unwrap();
    assert_eq!(rig.capture.start(), Err(VoiceError::AlreadyListening));
    rig.capture.stop();

    rig.state.begin_request().unwrap();
    assert_eq!(rig.capture.start(), Err(VoiceError::CaptureThinking));
    rig.state.finish_request();

    rig.state.begin_speaking(2).unwrap();
    assert_eq!(rig.capture.start(), Err(VoiceError::PlaybackActive));
    rig.state.finish_speaking();

    assert_eq!(rig.mic.open_tracks(), 0);
    assert!(rig.capture.start().is_ok());
}

#[tokio::test]
async fn failed_recognition_start_releases_microphone() {
    let rig = rig();
    rig.recognizer.fail_start.store(true, Ordering::SeqCst);

    assert!(matches!(
        rig.capture.start(),
        Err(VoiceError::RecognitionError(_))
    ));
    assert!(!rig.guard.is_held());
    assert_eq!(rig.mic.open_tracks(), 0);
    assert!(!rig.state.snapshot().is_capturing());
}

#[tokio::test]
async fn stale_session_events_are_ignored() {
    let rig = rig();
    let mut events = rig.capture.subscribe();

    rig.capture.start().unwrap();
    rig.capture.stop();
    rig.capture.start().unwrap();
    assert_eq!(next(&mut events).await, CaptureEvent::Started);
    assert_eq!(
        next(&mut events).await,
        CaptureEvent::Stopped(StopReason::Requested)
    );
    assert_eq!(next(&mut events).await, CaptureEvent::Started);
    assert_eq!(rig.recognizer.starts.load(Ordering::SeqCst), 2);

    rig.recognizer.interim("second cycle");
    assert_eq!(
        next(&mut events).await,
        CaptureEvent::TranscriptFragment("second cycle".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn audio_level_is_sampled_while_listening() {
    let rig = rig();
    let mut events = rig.capture.subscribe();
    rig.capture.start().unwrap();
    assert_eq!(next(&mut events).await, CaptureEvent::Started);

    tokio::time::sleep(Duration::from_millis(250)).await;
    match next(&mut events).await {
        CaptureEvent::AudioLevel(level) => assert!((level - 0.5).abs() < 1e-5),
        other => panic!("expected a level sample, got {other:?}"),
    }

    rig.capture.stop();
    let rest = events.drain();
    assert!(rest.contains(&CaptureEvent::Stopped(StopReason::Requested)));

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(events.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn zero_level_interval_is_raised_to_the_minimum() {
    let mic = FakeMicrophone::new();
    let capture = SpeechCapture::new(
        ResourceGuard::new(mic),
        ScriptedRecognizer::new(),
        SessionStateCell::new(),
        CaptureConfig {
            language: "en-US".to_string(),
            level_interval: Duration::ZERO,
        },
    );
    let mut events = capture.subscribe();
    capture.start().unwrap();
    assert_eq!(next(&mut events).await, CaptureEvent::Started);

    tokio::time::sleep(MIN_LEVEL_INTERVAL * 3).await;
    assert!(matches!(
        next(&mut events).await,
        CaptureEvent::AudioLevel(_)
    ));
    assert!(capture.stop());
}

#[tokio::test]
async fn dropping_the_controller_releases_the_microphone() {
    let rig = rig();
    rig.capture.start().unwrap();
    assert!(rig.guard.is_held());

    drop(rig.capture);
    assert!(!rig.guard.is_held());
    assert!(!rig.state.snapshot().is_capturing());
}
