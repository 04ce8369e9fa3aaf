//! Client configuration and credentials.

use std::time::Duration;

use crate::error::{Error, Result};

/// Default API host.
pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";

/// Default items per page for listing endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// App-only credentials.
#[derive(Clone)]
pub struct Credentials {
    /// OAuth 2.0 bearer token.
    pub bearer_token: String,
}

impl Credentials {
    #[must_use]
    pub fn new(bearer_token: impl Into<String>) -> Self {
        Self {
            bearer_token: bearer_token.into(),
        }
    }

    /// Load credentials from `BEARER_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let bearer_token = std::env::var("BEARER_TOKEN")
            .map_err(|_| Error::Config("BEARER_TOKEN must be provided in the environment".to_string()))?;
        if bearer_token.trim().is_empty() {
            return Err(Error::Config("BEARER_TOKEN is empty".to_string()));
        }
        Ok(Self::new(bearer_token))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("bearer_token", &"<redacted>")
            .finish()
    }
}

/// HTTP client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and host of the API, without trailing slash.
    pub api_base: String,
    /// Requested page size; clamped per endpoint.
    pub page_size: u32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Configuration from environment variables.
    ///
    /// # Optional Environment Variables
    /// - `SNA_API_BASE`: API host (default: https://api.twitter.com)
    /// - `SNA_PAGE_SIZE`: items per page (default: 100)
    /// - `SNA_TIMEOUT_SECS`: request timeout (default: 30)
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_base = std::env::var("SNA_API_BASE").unwrap_or(defaults.api_base);

        let page_size = std::env::var("SNA_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.page_size);

        let timeout = std::env::var("SNA_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or(defaults.timeout, Duration::from_secs);

        Self {
            api_base,
            page_size,
            timeout,
        }
        .normalized()
    }

    /// Point the client at another host (used by tests).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self.normalized()
    }

    fn normalized(mut self) -> Self {
        while self.api_base.ends_with('/') {
            self.api_base.pop();
        }
        self
    }
}
