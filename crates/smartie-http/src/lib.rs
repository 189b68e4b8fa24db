#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

mod answer;
mod config;
mod error;
mod http;
mod synthesis;

pub use answer::{DefaultAnswerClient, HttpAnswerService};
pub use config::{DEFAULT_ANSWER_URL, DEFAULT_SYNTHESIS_URL, HttpClientConfig};
pub use error::{HttpError, HttpResult};
pub use http::{BinaryBody, HttpBackend, ReqwestBackend};
pub use synthesis::{DefaultSynthesisClient, HttpSpeechSynthesizer};
