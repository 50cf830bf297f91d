//! Client settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Address used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://fieldsync.example.com/api/1.1";

// ============================================================================
// Client Settings
// ============================================================================

/// Everything needed to build a [`crate::SyncClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Backend base address; request paths are joined onto it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Timeout for establishing one connection, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// How long the transport keeps trying an unreachable host, in seconds.
    #[serde(default = "default_connectivity_wait_secs")]
    pub connectivity_wait_secs: u64,

    /// Minimum spacing between dispatched requests, in milliseconds.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Requests allowed in flight at once.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Retry ceiling and delays.
    #[serde(default)]
    pub retry: RetryPolicy,

    /// User agent override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_connectivity_wait_secs() -> u64 {
    30
}

fn default_min_interval_ms() -> u64 {
    500
}

fn default_max_concurrent_requests() -> usize {
    5
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            connectivity_wait_secs: default_connectivity_wait_secs(),
            min_interval_ms: default_min_interval_ms(),
            max_concurrent_requests: default_max_concurrent_requests(),
            retry: RetryPolicy::default(),
            user_agent: None,
        }
    }
}

impl ClientSettings {
    /// Default settings pointed at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Whole-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connection establishment timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Connectivity wait window.
    pub fn connectivity_wait(&self) -> Duration {
        Duration::from_secs(self.connectivity_wait_secs)
    }

    /// Minimum spacing between requests.
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    /// Sets the minimum spacing between requests.
    #[must_use]
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}
