//! Answer service port definition.
//!
//! The answer service is an opaque remote collaborator: one question in, one
//! answer with optional source references out. Different service revisions
//! name the response fields differently, so adapters hand the raw JSON body
//! to [`Answer::from_payload`] which normalises it into domain types.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::message::{Citation, Message};

/// Errors that can occur while obtaining an answer.
#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("Answer service unreachable: {0}")]
    Network(String),

    #[error("Answer service timed out")]
    Timeout,

    #[error("Answer service returned status {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Malformed answer payload: {0}")]
    Malformed(String),
}

/// Request body sent to the answer service.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerRequest {
    pub question: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub chat_history: Vec<Message>,
}

/// A normalised answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl Answer {
    /// Normalise a raw response body.
    ///
    /// Accepts `answer` or `reply` for the text and `sources`, `references`,
    /// or `citations` for the source list. Each source takes its label from
    /// `number`, `label`, or `title` and its target from `url` or `link`;
    /// sources without a target are dropped. A body carrying an `error` field
    /// or no answer text is rejected.
    pub fn from_payload(payload: &Value) -> Result<Self, AnswerError> {
        let Some(body) = payload.as_object() else {
            return Err(AnswerError::Malformed("expected a JSON object".to_string()));
        };

        if let Some(err) = body.get("error").filter(|v| !v.is_null()) {
            return Err(AnswerError::Service {
                status: 200,
                message: value_to_label(err).unwrap_or_else(|| err.to_string()),
            });
        }

        let text = ["answer", "reply"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .ok_or_else(|| AnswerError::Malformed("missing answer text".to_string()))?;

        let citations = ["sources", "references", "citations"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_array))
            .map(|sources| sources.iter().filter_map(parse_source).collect())
            .unwrap_or_default();

        Ok(Self {
            text: text.to_string(),
            citations,
        })
    }
}

fn parse_source(source: &Value) -> Option<Citation> {
    let entry = source.as_object()?;
    let url = ["url", "link"]
        .iter()
        .find_map(|key| entry.get(*key).and_then(Value::as_str))?;
    let label = ["number", "label", "title"]
        .iter()
        .find_map(|key| entry.get(*key).and_then(value_to_label))
        .unwrap_or_else(|| url.to_string());
    Some(Citation::new(label, url))
}

fn value_to_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Port for the remote answering service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerService: Send + Sync {
    /// Ask one question. Exactly one remote call per invocation.
    async fn ask(&self, request: &AnswerRequest) -> Result<Answer, AnswerError>;
}
