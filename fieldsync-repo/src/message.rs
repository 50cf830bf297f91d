//! User-facing error messages.

use fieldsync_fetch::{NetworkCause, SyncError};

/// Maps a classified error to a short sentence a field user can act on.
pub fn user_message(error: &SyncError) -> &'static str {
    match error {
        SyncError::Unauthorized => "Your session has expired. Please sign in again.",
        SyncError::RateLimited => "The server is busy. Please try again in a moment.",
        SyncError::ServerError(_) => "The server had a problem. Please try again later.",
        SyncError::NetworkError(NetworkCause::Cancelled) => "The operation was cancelled.",
        SyncError::NetworkError(NetworkCause::Timeout) => {
            "The server took too long to respond. Check your connection and try again."
        }
        SyncError::NetworkError(NetworkCause::Connectivity) => {
            "No connection. Your changes will sync when you are back online."
        }
        SyncError::HttpError(404) => "That item no longer exists.",
        SyncError::HttpError(_) => "The request was rejected by the server.",
        SyncError::DecodingFailed | SyncError::InvalidResponse(_) => {
            "The server sent an unexpected response."
        }
        SyncError::InvalidUrl(_) | SyncError::InvalidRequest(_) => {
            "Something went wrong preparing the request."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_short_and_untechnical() {
        let errors = [
            SyncError::InvalidUrl("x".into()),
            SyncError::InvalidRequest("x".into()),
            SyncError::InvalidResponse("x".into()),
            SyncError::DecodingFailed,
            SyncError::Unauthorized,
            SyncError::RateLimited,
            SyncError::ServerError(500),
            SyncError::NetworkError(NetworkCause::Connectivity),
            SyncError::NetworkError(NetworkCause::Timeout),
            SyncError::CANCELLED,
            SyncError::HttpError(404),
            SyncError::HttpError(409),
        ];
        for error in &errors {
            let message = user_message(error);
            assert!(message.len() < 100, "{message}");
            assert!(!message.contains("HTTP"), "{message}");
        }
    }

    #[test]
    fn test_cancelled_is_distinct_from_offline() {
        assert_ne!(
            user_message(&SyncError::CANCELLED),
            user_message(&SyncError::NetworkError(NetworkCause::Connectivity))
        );
    }
}
