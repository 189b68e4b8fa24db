//! Public configuration for the HTTP adapters.

use std::time::Duration;

/// Default answer endpoint of a locally running backend.
pub const DEFAULT_ANSWER_URL: &str = "http://localhost:8000/api/chat/";

/// Default speech-synthesis endpoint of a locally running backend.
pub const DEFAULT_SYNTHESIS_URL: &str = "http://localhost:8000/api/tts/";

/// Configuration shared by the answer and synthesis clients.
///
/// # Example
///
/// ```
/// use smartie_http::HttpClientConfig;
/// use std::time::Duration;
///
/// let config = HttpClientConfig::new()
///     .with_answer_url("https://assistant.example/api/chat/")
///     .with_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub(crate) answer_url: String,
    pub(crate) synthesis_url: String,
    pub(crate) timeout: Duration,
    pub(crate) user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            answer_url: DEFAULT_ANSWER_URL.to_string(),
            synthesis_url: DEFAULT_SYNTHESIS_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("smartie/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpClientConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_answer_url(mut self, url: impl Into<String>) -> Self {
        self.answer_url = url.into();
        self
    }

    #[must_use]
    pub fn with_synthesis_url(mut self, url: impl Into<String>) -> Self {
        self.synthesis_url = url.into();
        self
    }

    /// Per-request timeout. Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn answer_url(&self) -> &str {
        &self.answer_url
    }

    pub fn synthesis_url(&self) -> &str {
        &self.synthesis_url
    }
}
