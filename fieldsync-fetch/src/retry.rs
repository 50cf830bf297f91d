//! Outcome classification and retry policy.
//!
//! Every dispatch ends in a [`Classification`]. The [`RetryPolicy`] decides
//! which classifications are worth another attempt and how long to wait
//! first; [`RetryState`] counts attempts for one logical operation.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{NetworkCause, SyncError, TransportError};
use crate::request::RequestDescriptor;

// ============================================================================
// Classification
// ============================================================================

/// What one dispatch attempt amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// 2xx with a decodable body.
    Success,
    /// 401 or 403.
    Unauthorized,
    /// 429.
    RateLimited,
    /// 5xx.
    ServerError(u16),
    /// Connectivity loss or timeout.
    Network(NetworkCause),
    /// The caller cancelled the operation.
    Cancelled,
    /// A transport anomaly that is not connectivity.
    InvalidResponse(String),
    /// Any other non-2xx status.
    Http(u16),
    /// 2xx whose body could not be decoded.
    DecodingFailed,
}

impl Classification {
    /// Classifies an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => Self::Success,
            401 | 403 => Self::Unauthorized,
            429 => Self::RateLimited,
            500..=599 => Self::ServerError(status),
            other => Self::Http(other),
        }
    }

    /// Classifies a transport failure.
    pub fn from_transport(error: &TransportError) -> Self {
        match error {
            TransportError::Unreachable(_) | TransportError::ConnectionLost(_) => {
                Self::Network(NetworkCause::Connectivity)
            }
            TransportError::Timeout => Self::Network(NetworkCause::Timeout),
            TransportError::Other(msg) => Self::InvalidResponse(msg.clone()),
        }
    }

    /// Returns true for a successful attempt.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Converts a failed classification into the error surfaced to callers.
    ///
    /// Returns `None` for [`Classification::Success`].
    pub fn into_error(self) -> Option<SyncError> {
        Some(match self {
            Self::Success => return None,
            Self::Unauthorized => SyncError::Unauthorized,
            Self::RateLimited => SyncError::RateLimited,
            Self::ServerError(code) => SyncError::ServerError(code),
            Self::Network(cause) => SyncError::NetworkError(cause),
            Self::Cancelled => SyncError::CANCELLED,
            Self::InvalidResponse(msg) => SyncError::InvalidResponse(msg),
            Self::Http(code) => SyncError::HttpError(code),
            Self::DecodingFailed => SyncError::DecodingFailed,
        })
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Unauthorized => f.write_str("unauthorized"),
            Self::RateLimited => f.write_str("rate limited"),
            Self::ServerError(code) => write!(f, "server error {code}"),
            Self::Network(cause) => write!(f, "network error ({cause})"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::InvalidResponse(msg) => write!(f, "invalid response ({msg})"),
            Self::Http(code) => write!(f, "http error {code}"),
            Self::DecodingFailed => f.write_str("decoding failed"),
        }
    }
}

// ============================================================================
// Retry Policy
// ============================================================================

/// Bounded retry with a fixed delay per failure class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Extra attempts allowed after the first.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before retrying a 429, in milliseconds.
    #[serde(default = "default_rate_limited_delay_ms")]
    pub rate_limited_delay_ms: u64,
    /// Delay before retrying a 5xx, in milliseconds.
    #[serde(default = "default_server_error_delay_ms")]
    pub server_error_delay_ms: u64,
    /// Delay before retrying a connectivity failure, in milliseconds.
    #[serde(default = "default_network_delay_ms")]
    pub network_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    2
}

fn default_rate_limited_delay_ms() -> u64 {
    1_000
}

fn default_server_error_delay_ms() -> u64 {
    2_000
}

fn default_network_delay_ms() -> u64 {
    2_000
}

impl RetryPolicy {
    /// Creates a policy with the default delays and `max_retries` extra attempts.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self::new(0)
    }

    /// Sets the delay before retrying a 429.
    #[must_use]
    pub fn with_rate_limited_delay(mut self, delay: Duration) -> Self {
        self.rate_limited_delay_ms = millis(delay);
        self
    }

    /// Sets the delay before retrying a 5xx.
    #[must_use]
    pub fn with_server_error_delay(mut self, delay: Duration) -> Self {
        self.server_error_delay_ms = millis(delay);
        self
    }

    /// Sets the delay before retrying a connectivity failure.
    #[must_use]
    pub fn with_network_delay(mut self, delay: Duration) -> Self {
        self.network_delay_ms = millis(delay);
        self
    }

    /// Returns the delay before retrying `classification`, or `None` if it
    /// is terminal.
    ///
    /// Cancellation is terminal even though it is reported as a network
    /// error: retrying would override the caller.
    pub fn delay_for(&self, classification: &Classification) -> Option<Duration> {
        let ms = match classification {
            Classification::RateLimited => self.rate_limited_delay_ms,
            Classification::ServerError(_) => self.server_error_delay_ms,
            Classification::Network(NetworkCause::Connectivity | NetworkCause::Timeout) => {
                self.network_delay_ms
            }
            Classification::Success
            | Classification::Unauthorized
            | Classification::Network(NetworkCause::Cancelled)
            | Classification::Cancelled
            | Classification::InvalidResponse(_)
            | Classification::Http(_)
            | Classification::DecodingFailed => return None,
        };
        Some(Duration::from_millis(ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            rate_limited_delay_ms: default_rate_limited_delay_ms(),
            server_error_delay_ms: default_server_error_delay_ms(),
            network_delay_ms: default_network_delay_ms(),
        }
    }
}

fn millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Retry State
// ============================================================================

/// Attempt bookkeeping for one logical operation.
#[derive(Debug)]
pub struct RetryState<'a> {
    policy: &'a RetryPolicy,
    request: &'a RequestDescriptor,
    attempts: u32,
}

impl<'a> RetryState<'a> {
    /// Starts counting attempts for `request`.
    pub fn new(policy: &'a RetryPolicy, request: &'a RequestDescriptor) -> Self {
        Self {
            policy,
            request,
            attempts: 0,
        }
    }

    /// Records the start of an attempt and returns its 1-based number.
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    /// Attempts started so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Attempts still allowed.
    pub fn remaining(&self) -> u32 {
        (self.policy.max_retries + 1).saturating_sub(self.attempts)
    }

    /// The request being attempted.
    pub fn request(&self) -> &RequestDescriptor {
        self.request
    }

    /// Returns the delay before the next attempt, or `None` if the
    /// classification is terminal or the ceiling is reached.
    pub fn next_delay(&self, classification: &Classification) -> Option<Duration> {
        if self.remaining() == 0 {
            return None;
        }
        self.policy.delay_for(classification)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(Classification::from_status(200), Classification::Success);
        assert_eq!(Classification::from_status(204), Classification::Success);
        assert_eq!(Classification::from_status(401), Classification::Unauthorized);
        assert_eq!(Classification::from_status(403), Classification::Unauthorized);
        assert_eq!(Classification::from_status(429), Classification::RateLimited);
        assert_eq!(
            Classification::from_status(503),
            Classification::ServerError(503)
        );
        assert_eq!(Classification::from_status(404), Classification::Http(404));
        assert_eq!(Classification::from_status(302), Classification::Http(302));
    }

    #[test]
    fn test_transport_classification() {
        assert_eq!(
            Classification::from_transport(&TransportError::Unreachable("dns".into())),
            Classification::Network(NetworkCause::Connectivity)
        );
        assert_eq!(
            Classification::from_transport(&TransportError::ConnectionLost("reset".into())),
            Classification::Network(NetworkCause::Connectivity)
        );
        assert_eq!(
            Classification::from_transport(&TransportError::Timeout),
            Classification::Network(NetworkCause::Timeout)
        );
        assert!(matches!(
            Classification::from_transport(&TransportError::Other("bad".into())),
            Classification::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_fixed_delays() {
        let policy = RetryPolicy::default();

        assert_eq!(
            policy.delay_for(&Classification::RateLimited),
            Some(Duration::from_secs(1))
        );
        assert_eq!(
            policy.delay_for(&Classification::ServerError(500)),
            Some(Duration::from_secs(2))
        );
        assert_eq!(
            policy.delay_for(&Classification::Network(NetworkCause::Timeout)),
            Some(Duration::from_secs(2))
        );
    }

    #[test]
    fn test_terminal_classes_never_retry() {
        let policy = RetryPolicy::default();

        for terminal in [
            Classification::Unauthorized,
            Classification::Cancelled,
            Classification::Network(NetworkCause::Cancelled),
            Classification::Http(404),
            Classification::DecodingFailed,
            Classification::InvalidResponse("x".into()),
        ] {
            assert_eq!(policy.delay_for(&terminal), None, "{terminal} retried");
        }
    }

    #[test]
    fn test_state_enforces_ceiling() {
        let policy = RetryPolicy::default();
        let request = RequestDescriptor::get("obj/task").build();
        let mut state = RetryState::new(&policy, &request);

        assert_eq!(state.begin_attempt(), 1);
        assert!(state.next_delay(&Classification::ServerError(500)).is_some());
        assert_eq!(state.begin_attempt(), 2);
        assert!(state.next_delay(&Classification::ServerError(500)).is_some());
        assert_eq!(state.begin_attempt(), 3);
        assert_eq!(state.remaining(), 0);
        assert!(state.next_delay(&Classification::ServerError(500)).is_none());
        assert_eq!(state.request().path(), "obj/task");
    }

    #[test]
    fn test_no_retry() {
        let policy = RetryPolicy::no_retry();
        let request = RequestDescriptor::get("obj/task").build();
        let mut state = RetryState::new(&policy, &request);

        state.begin_attempt();
        assert!(state.next_delay(&Classification::RateLimited).is_none());
    }

    #[test]
    fn test_into_error_mapping() {
        assert_eq!(Classification::Success.into_error(), None);
        assert_eq!(
            Classification::Cancelled.into_error(),
            Some(SyncError::CANCELLED)
        );
        assert_eq!(
            Classification::ServerError(502).into_error(),
            Some(SyncError::ServerError(502))
        );
        assert_eq!(
            Classification::Http(418).into_error(),
            Some(SyncError::HttpError(418))
        );
    }

    #[test]
    fn test_custom_delays() {
        let policy = RetryPolicy::new(5)
            .with_rate_limited_delay(Duration::from_millis(250))
            .with_network_delay(Duration::from_secs(10));

        assert_eq!(policy.max_retries, 5);
        assert_eq!(
            policy.delay_for(&Classification::RateLimited),
            Some(Duration::from_millis(250))
        );
        assert_eq!(
            policy.delay_for(&Classification::Network(NetworkCause::Connectivity)),
            Some(Duration::from_secs(10))
        );
    }
}
