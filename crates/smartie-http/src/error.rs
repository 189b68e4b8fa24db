//! Internal error types for HTTP operations.
//!
//! These errors stay inside `smartie-http` and are mapped to the port errors
//! (`AnswerError`, `VoiceError`) at the boundary.

use smartie_core::AnswerError;
use smartie_voice::VoiceError;
use thiserror::Error;

pub type HttpResult<T> = Result<T, HttpError>;

/// Longest response-body excerpt kept in a status error.
const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum HttpError {
    /// The server answered with a non-success status.
    #[error("Request to {url} failed with status {status}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Response from {url} had an empty body")]
    EmptyBody { url: String },
}

impl HttpError {
    pub(crate) fn status(status: u16, url: &str, body: &str) -> Self {
        Self::Status {
            status,
            url: url.to_string(),
            body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
        }
    }
}

impl From<HttpError> for AnswerError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Status { status, body, .. } => Self::Service {
                status,
                message: body,
            },
            HttpError::Timeout { .. } => Self::Timeout,
            HttpError::Network(e) => Self::Network(e.to_string()),
            HttpError::InvalidUrl(e) => Self::Network(e.to_string()),
            HttpError::JsonParse(e) => Self::Malformed(e.to_string()),
            HttpError::EmptyBody { .. } => Self::Malformed("empty response body".to_string()),
        }
    }
}

impl From<HttpError> for VoiceError {
    fn from(err: HttpError) -> Self {
        Self::SynthesisError(err.to_string())
    }
}
