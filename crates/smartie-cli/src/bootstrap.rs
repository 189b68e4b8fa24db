//! Composition root: turns parsed arguments into a running [`Session`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use smartie_core::{
    FixedLocation, GeoPosition, KeyValueStore, MemoryStore, SessionConfig, TranscriptPolicy,
};
use smartie_http::{DefaultAnswerClient, HttpClientConfig};
use smartie_session::{Session, SessionServices};
use smartie_store::JsonFileStore;

use crate::parser::Cli;

pub fn session_config(cli: &Cli) -> SessionConfig {
    SessionConfig {
        transcript_policy: if cli.clear_on_start {
            TranscriptPolicy::ClearOnStart
        } else {
            TranscriptPolicy::Restore
        },
        auto_speak_typed: cli.speak,
        answer_timeout_secs: cli.timeout,
        ..SessionConfig::default()
    }
}

pub fn http_config(cli: &Cli) -> HttpClientConfig {
    HttpClientConfig::new()
        .with_answer_url(&cli.answer_url)
        .with_synthesis_url(&cli.tts_url)
        .with_timeout(Duration::from_secs(cli.timeout))
}

/// Wire every adapter and open the session.
pub fn bootstrap(cli: &Cli) -> Result<Arc<Session>> {
    let http = http_config(cli);
    let answers = DefaultAnswerClient::new(&http).context("Failed to build answer client")?;

    let storage: Arc<dyn KeyValueStore> = match cli.store_path() {
        Some(path) => {
            tracing::info!(path = %path.display(), "Using session file");
            Arc::new(
                JsonFileStore::open(&path)
                    .with_context(|| format!("Failed to open {}", path.display()))?,
            )
        }
        None => {
            tracing::warn!("No data directory, the session will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let mut services = SessionServices::text_only(Arc::new(answers), storage);
    if let (Some(latitude), Some(longitude)) = (cli.latitude, cli.longitude) {
        services = services.with_location(Arc::new(FixedLocation(GeoPosition {
            latitude,
            longitude,
        })));
    }
    services = with_playback(services, &http)?;

    Ok(Session::new(session_config(cli), services)?)
}

#[cfg(feature = "local-playback")]
fn with_playback(services: SessionServices, http: &HttpClientConfig) -> Result<SessionServices> {
    use smartie_http::DefaultSynthesisClient;
    use smartie_voice::RodioOutput;

    let synthesizer =
        DefaultSynthesisClient::new(http).context("Failed to build synthesis client")?;
    match RodioOutput::open_default() {
        Ok(output) => Ok(services.with_playback(Arc::new(synthesizer), Arc::new(output))),
        Err(e) => {
            tracing::warn!(error = %e, "No audio output, replies will not be spoken");
            Ok(services)
        }
    }
}

#[cfg(not(feature = "local-playback"))]
#[allow(clippy::unnecessary_wraps)]
fn with_playback(services: SessionServices, _http: &HttpClientConfig) -> Result<SessionServices> {
    Ok(services)
}
