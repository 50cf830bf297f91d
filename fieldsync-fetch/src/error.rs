//! Sync error types.

use std::fmt;

use thiserror::Error;

// ============================================================================
// Sync Error
// ============================================================================

/// Classified error returned by every request the client makes.
///
/// These kinds are the whole contract with callers. Raw backend bodies and
/// decoding diagnostics never travel inside them; diagnostics are logged
/// where they occur.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request could not be assembled before dispatch.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The transport failed in a way that is neither an HTTP status nor a
    /// connectivity problem.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The response body did not match the expected shape.
    #[error("Response could not be decoded")]
    DecodingFailed,

    /// Credentials were missing or rejected (401/403).
    #[error("Not authorized")]
    Unauthorized,

    /// The server kept answering 429 until retries ran out.
    #[error("Rate limited by the server")]
    RateLimited,

    /// The server kept failing with 5xx until retries ran out.
    #[error("Server error (HTTP {0})")]
    ServerError(u16),

    /// Connectivity failed until retries ran out, or the call was cancelled.
    #[error("Network error: {0}")]
    NetworkError(NetworkCause),

    /// Any other non-success status.
    #[error("HTTP error {0}")]
    HttpError(u16),
}

impl SyncError {
    /// The error returned when the caller cancels an operation.
    pub const CANCELLED: SyncError = SyncError::NetworkError(NetworkCause::Cancelled);

    /// Returns true if the operation was cancelled by the caller.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::NetworkError(NetworkCause::Cancelled))
    }

    /// Returns the HTTP status behind this error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerError(code) | Self::HttpError(code) => Some(*code),
            Self::RateLimited => Some(429),
            _ => None,
        }
    }
}

/// Why a network error happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkCause {
    /// No connection could be made or it dropped mid-exchange.
    Connectivity,
    /// The request timed out.
    Timeout,
    /// The caller cancelled the operation.
    Cancelled,
}

impl fmt::Display for NetworkCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connectivity => "connection failed",
            Self::Timeout => "request timed out",
            Self::Cancelled => "cancelled",
        })
    }
}

// ============================================================================
// Transport Error
// ============================================================================

/// Failure below the HTTP status level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No connection could be established; nothing reached the server.
    #[error("Host unreachable: {0}")]
    Unreachable(String),

    /// The connection dropped mid-exchange.
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// The request exceeded its timeout.
    #[error("Request timed out")]
    Timeout,

    /// Anything else, such as a malformed response.
    #[error("Transport failure: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Unreachable(err.to_string())
        } else if err.is_request() || err.is_body() {
            TransportError::ConnectionLost(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

// ============================================================================
// Decode Error
// ============================================================================

/// Developer-facing reason a body failed to decode.
///
/// Logged by the executor, then collapsed to [`SyncError::DecodingFailed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The body was empty but the caller expected content.
    #[error("Expected a body, got an empty response")]
    UnexpectedEmpty,

    /// A required key was absent.
    #[error("Missing key at {path}: {message}")]
    MissingKey {
        /// Where in the body decoding stopped.
        path: &'static str,
        /// Serde's description.
        message: String,
    },

    /// A value had the wrong type.
    #[error("Type mismatch at {path}: {message}")]
    TypeMismatch {
        /// Where in the body decoding stopped.
        path: &'static str,
        /// Serde's description.
        message: String,
    },

    /// The body was not valid JSON.
    #[error("Corrupted payload: {0}")]
    Corrupted(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_helpers() {
        assert!(SyncError::CANCELLED.is_cancelled());
        assert!(!SyncError::NetworkError(NetworkCause::Timeout).is_cancelled());
    }

    #[test]
    fn test_status_extraction() {
        assert_eq!(SyncError::ServerError(503).status(), Some(503));
        assert_eq!(SyncError::HttpError(404).status(), Some(404));
        assert_eq!(SyncError::RateLimited.status(), Some(429));
        assert_eq!(SyncError::Unauthorized.status(), None);
    }

    #[test]
    fn test_display_hides_bodies() {
        assert_eq!(
            SyncError::DecodingFailed.to_string(),
            "Response could not be decoded"
        );
        assert_eq!(
            SyncError::CANCELLED.to_string(),
            "Network error: cancelled"
        );
    }
}
