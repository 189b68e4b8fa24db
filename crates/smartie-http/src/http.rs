//! HTTP backend abstraction.
//!
//! The clients are generic over [`HttpBackend`] so they can be exercised
//! without a server; [`ReqwestBackend`] is the production implementation.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use url::Url;

use crate::config::HttpClientConfig;
use crate::error::{HttpError, HttpResult};

/// Raw response body together with its declared media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryBody {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// POST-only transport used by the adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// POST `body` as JSON and parse the JSON response.
    async fn post_json(&self, url: &Url, body: &Value) -> HttpResult<Value>;

    /// POST `body` as JSON and return the raw response.
    async fn post_for_bytes(&self, url: &Url, body: &Value) -> HttpResult<BinaryBody>;
}

/// Production backend on a shared `reqwest::Client`.
pub struct ReqwestBackend {
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(config: &HttpClientConfig) -> HttpResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    async fn send(&self, url: &Url, body: &Value) -> HttpResult<reqwest::Response> {
        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| classify(e, url))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        tracing::debug!(%url, status = status.as_u16(), "Request rejected");
        Err(HttpError::status(status.as_u16(), url.as_str(), &text))
    }
}

fn classify(err: reqwest::Error, url: &Url) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout {
            url: url.to_string(),
        }
    } else {
        HttpError::Network(err)
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn post_json(&self, url: &Url, body: &Value) -> HttpResult<Value> {
        let response = self.send(url, body).await?;
        let bytes = response.bytes().await.map_err(|e| classify(e, url))?;
        if bytes.is_empty() {
            return Err(HttpError::EmptyBody {
                url: url.to_string(),
            });
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn post_for_bytes(&self, url: &Url, body: &Value) -> HttpResult<BinaryBody> {
        let response = self.send(url, body).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(|e| classify(e, url))?;
        Ok(BinaryBody {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}
