//! HTTP client configuration

use std::time::Duration;

/// Request timeout applied to every call made through one client
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(40);

/// HTTP transport configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Whole-request timeout (connect, send, read body)
    pub timeout: Duration,
    /// User-Agent header value
    pub user_agent: Option<String>,
}

impl HttpConfig {
    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the User-Agent header
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: Some(concat!("bitquery-sdk/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}
