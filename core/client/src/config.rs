//! Client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use cblite_common::{Error, Result};

/// Configuration for the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// User agent sent with every request.
    pub user_agent: String,
    /// Total request timeout, in milliseconds.
    pub request_timeout_ms: u64,
    /// Connection establishment timeout, in milliseconds.
    pub connect_timeout_ms: u64,
}

impl ClientConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::InvalidInput(format!("Invalid client config: {}", e)))
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = millis(timeout);
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = millis(timeout);
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Whole milliseconds, saturating; a non-zero duration never rounds to zero.
fn millis(timeout: Duration) -> u64 {
    if timeout.is_zero() {
        return 0;
    }
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX).max(1)
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("cblite/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
        }
    }
}
