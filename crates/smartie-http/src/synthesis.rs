//! `SpeechSynthesizer` over HTTP.

use async_trait::async_trait;
use serde_json::json;
use smartie_voice::{SpeechSynthesizer, SynthesizedAudio, VoiceError};
use url::Url;

use crate::config::HttpClientConfig;
use crate::error::{HttpError, HttpResult};
use crate::http::{HttpBackend, ReqwestBackend};

/// Assumed when the service does not declare a media type.
const FALLBACK_CONTENT_TYPE: &str = "audio/mpeg";

pub type DefaultSynthesisClient = HttpSpeechSynthesizer<ReqwestBackend>;

/// Posts `{text}` to the synthesis endpoint and returns the audio bytes.
pub struct HttpSpeechSynthesizer<B: HttpBackend> {
    backend: B,
    url: Url,
}

impl DefaultSynthesisClient {
    pub fn new(config: &HttpClientConfig) -> HttpResult<Self> {
        Self::with_backend(config, ReqwestBackend::new(config)?)
    }
}

impl<B: HttpBackend> HttpSpeechSynthesizer<B> {
    pub fn with_backend(config: &HttpClientConfig, backend: B) -> HttpResult<Self> {
        Ok(Self {
            backend,
            url: Url::parse(&config.synthesis_url)?,
        })
    }
}

#[async_trait]
impl<B: HttpBackend> SpeechSynthesizer for HttpSpeechSynthesizer<B> {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, VoiceError> {
        let body = self
            .backend
            .post_for_bytes(&self.url, &json!({ "text": text }))
            .await?;
        if body.bytes.is_empty() {
            return Err(HttpError::EmptyBody {
                url: self.url.to_string(),
            }
            .into());
        }
        tracing::debug!(bytes = body.bytes.len(), "Synthesized audio received");
        Ok(SynthesizedAudio {
            bytes: body.bytes,
            content_type: body
                .content_type
                .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{BinaryBody, MockHttpBackend};

    fn client(backend: MockHttpBackend) -> HttpSpeechSynthesizer<MockHttpBackend> {
        HttpSpeechSynthesizer::with_backend(&HttpClientConfig::default(), backend).unwrap()
    }

    #[tokio::test]
    async fn returns_audio_with_declared_type() {
        let mut backend = MockHttpBackend::new();
        backend
            .expect_post_for_bytes()
            .withf(|url, body| url.path() == "/api/tts/" && body["text"] == "Try Store A")
            .times(1)
            .returning(|_, _| {
                Ok(BinaryBody {
                    bytes: vec![1, 2, 3],
                    content_type: Some("audio/wav".to_string()),
                })
            });

        let audio = client(backend).synthesize("Try Store A").await.unwrap();
        assert_eq!(audio.bytes, vec![1, 2, 3]);
        assert_eq!(audio.content_type, "audio/wav");
    }

    #[tokio::test]
    async fn missing_content_type_falls_back_to_mpeg() {
        let mut backend = MockHttpBackend::new();
        backend.expect_post_for_bytes().returning(|_, _| {
            Ok(BinaryBody {
                bytes: vec![0xFF],
                content_type: None,
            })
        });

        let audio = client(backend).synthesize("hi").await.unwrap();
        assert_eq!(audio.content_type, FALLBACK_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn empty_audio_is_an_error() {
        let mut backend = MockHttpBackend::new();
        backend.expect_post_for_bytes().returning(|_, _| {
            Ok(BinaryBody {
                bytes: Vec::new(),
                content_type: None,
            })
        });

        let err = client(backend).synthesize("hi").await.unwrap_err();
        assert!(matches!(err, VoiceError::SynthesisError(_)));
    }

    #[tokio::test]
    async fn rejected_request_is_a_synthesis_error() {
        let mut backend = MockHttpBackend::new();
        backend
            .expect_post_for_bytes()
            .returning(|url, _| Err(HttpError::status(400, url.as_str(), "No text provided")));

        let err = client(backend).synthesize("hi").await.unwrap_err();
        assert!(matches!(err, VoiceError::SynthesisError(_)));
    }
}
