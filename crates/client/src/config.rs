//! Client configuration loaded from the environment.

use std::env;
use std::time::Duration;

/// Where the service listens when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable that overrides the base URL
pub const BASE_URL_ENV: &str = "ALMA_API_URL";

const USER_AGENT: &str = concat!("alma-client/", env!("CARGO_PKG_VERSION"));

/// Settings for a `RecommendationClient`
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service root, without a trailing slash
    pub base_url: String,
    /// Overall request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            timeout: None,
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let base_url = env::var(BASE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
