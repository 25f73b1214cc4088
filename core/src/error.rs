//! Error types for the envelope client.
//!
//! # Design
//! `ApiError` classifies why a call did not produce an envelope. The
//! collapsing client methods (`ApiClient::get` and friends) turn every
//! variant into an error envelope via its `Display` text, so the messages
//! here are what end users eventually see.

use thiserror::Error;

/// Errors produced while building, executing, or parsing a request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused connection,
    /// timeout, invalid URL).
    #[error("{0}")]
    Transport(String),

    /// The server answered with a status outside 200..=299.
    #[error("HTTP {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    /// A 2xx body was not a JSON envelope, or envelope data did not match
    /// the requested type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status of the failed call, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_display_matches_status_line() {
        let err = ApiError::HttpStatus {
            status: 404,
            reason: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn transport_display_is_the_raw_message() {
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.status(), None);
    }
}
