//! `AnswerService` over HTTP.

use async_trait::async_trait;
use smartie_core::{Answer, AnswerError, AnswerRequest, AnswerService};
use url::Url;

use crate::config::HttpClientConfig;
use crate::error::HttpResult;
use crate::http::{HttpBackend, ReqwestBackend};

/// Answer client on the production backend.
pub type DefaultAnswerClient = HttpAnswerService<ReqwestBackend>;

/// Posts each question to the answer endpoint and normalises the reply.
pub struct HttpAnswerService<B: HttpBackend> {
    backend: B,
    url: Url,
}

impl DefaultAnswerClient {
    pub fn new(config: &HttpClientConfig) -> HttpResult<Self> {
        Self::with_backend(config, ReqwestBackend::new(config)?)
    }
}

impl<B: HttpBackend> HttpAnswerService<B> {
    pub fn with_backend(config: &HttpClientConfig, backend: B) -> HttpResult<Self> {
        Ok(Self {
            backend,
            url: Url::parse(&config.answer_url)?,
        })
    }

    pub const fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl<B: HttpBackend> AnswerService for HttpAnswerService<B> {
    async fn ask(&self, request: &AnswerRequest) -> Result<Answer, AnswerError> {
        let body =
            serde_json::to_value(request).map_err(|e| AnswerError::Malformed(e.to_string()))?;
        tracing::debug!(
            url = %self.url,
            history = request.chat_history.len(),
            located = request.latitude.is_some(),
            "Posting question"
        );
        let payload = self.backend.post_json(&self.url, &body).await?;
        Answer::from_payload(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpError;
    use crate::http::MockHttpBackend;
    use serde_json::json;
    use smartie_core::{Citation, Message, Origin};
    use tokio_test::{assert_err, assert_ok};

    fn request() -> AnswerRequest {
        AnswerRequest {
            question: "where is milk".to_string(),
            name: "Ada".to_string(),
            latitude: None,
            longitude: None,
            chat_history: vec![Message::user("hi", Origin::Typed)],
        }
    }

    fn client(backend: MockHttpBackend) -> HttpAnswerService<MockHttpBackend> {
        assert_ok!(HttpAnswerService::with_backend(
            &HttpClientConfig::default(),
            backend
        ))
    }

    #[tokio::test]
    async fn posts_request_and_normalises_reply() {
        let mut backend = MockHttpBackend::new();
        backend
            .expect_post_json()
            .withf(|url, body| {
                url.as_str() == "http://localhost:8000/api/chat/"
                    && body["question"] == "where is milk"
                    && body["name"] == "Ada"
                    && body.get("latitude").is_none()
                    && body["chat_history"].as_array().is_some_and(|h| h.len() == 1)
            })
            .times(1)
            .returning(|_, _| {
                Ok(json!({
                    "answer": "Try Store A",
                    "sources": [{"number": 1, "url": "http://a"}]
                }))
            });

        let answer = assert_ok!(client(backend).ask(&request()).await);
        assert_eq!(answer.text, "Try Store A");
        assert_eq!(answer.citations, vec![Citation::new("1", "http://a")]);
    }

    #[tokio::test]
    async fn error_status_becomes_service_failure() {
        let mut backend = MockHttpBackend::new();
        backend
            .expect_post_json()
            .returning(|url, _| Err(HttpError::status(500, url.as_str(), "boom")));

        let err = assert_err!(client(backend).ask(&request()).await);
        assert!(matches!(err, AnswerError::Service { status: 500, .. }));
    }

    #[tokio::test]
    async fn timeout_is_reported_as_timeout() {
        let mut backend = MockHttpBackend::new();
        backend.expect_post_json().returning(|url, _| {
            Err(HttpError::Timeout {
                url: url.to_string(),
            })
        });

        let err = client(backend).ask(&request()).await.unwrap_err();
        assert!(matches!(err, AnswerError::Timeout));
    }

    #[tokio::test]
    async fn error_field_in_body_is_a_failure() {
        let mut backend = MockHttpBackend::new();
        backend
            .expect_post_json()
            .returning(|_, _| Ok(json!({"error": "index not loaded"})));

        let err = client(backend).ask(&request()).await.unwrap_err();
        assert!(matches!(err, AnswerError::Service { .. }));
    }

    #[test]
    fn invalid_url_is_rejected_at_construction() {
        let config = HttpClientConfig::new().with_answer_url("not a url");
        assert!(HttpAnswerService::with_backend(&config, MockHttpBackend::new()).is_err());
    }
}
