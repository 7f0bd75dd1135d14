//! Error definitions for the retrying client.

use std::sync::Arc;

use thiserror::Error;

/// Boxed error used for policy overrides and body streams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared transport failure. Shared so a policy can hand it back as an override.
pub type TransportError = Arc<dyn std::error::Error + Send + Sync>;

/// Errors that can be returned from a retrying call.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport failed to produce a response (connect, timeout, I/O).
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),

    /// The replayable request body could not be rewound to its start.
    #[error("failed to seek body: {0}")]
    BodyRewind(#[source] std::io::Error),

    /// An error produced by a retry policy in place of the transport error.
    #[error("{0}")]
    Policy(#[source] BoxError),

    /// The policy still wanted to retry but the attempt budget is spent.
    #[error("{method} {url} giving up after {attempts} attempts")]
    Exhausted {
        method: http::Method,
        url: url::Url,
        attempts: u64,
    },

    /// The request context was cancelled.
    #[error("context canceled")]
    Cancelled,

    /// The request context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// The HTTP method is not a valid token.
    #[error("invalid method: {0}")]
    InvalidMethod(String),

    /// The target could not be used as a request URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// A header name or value was rejected.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The per-attempt HTTP request could not be assembled.
    #[error("failed to build request: {0}")]
    Build(#[from] http::Error),
}

impl Error {
    /// Wrap any error as a transport failure.
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Transport(Arc::from(err.into()))
    }

    /// Wrap any error as a policy override.
    pub fn policy<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Policy(err.into())
    }

    /// Returns true for cancellation and deadline errors.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded)
    }

    /// Returns true if the retry budget was exhausted.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Error::Exhausted { .. })
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_display() {
        let err = Error::Exhausted {
            method: http::Method::GET,
            url: url::Url::parse("http://example.com/foo").unwrap(),
            attempts: 5,
        };
        assert_eq!(
            err.to_string(),
            "GET http://example.com/foo giving up after 5 attempts"
        );
        assert!(err.is_exhausted());
        assert!(!err.is_cancellation());
    }

    #[test]
    fn test_policy_error_is_transparent() {
        let err = Error::policy("custom failure");
        assert_eq!(err.to_string(), "custom failure");
    }

    #[test]
    fn test_cancellation_classification() {
        assert!(Error::Cancelled.is_cancellation());
        assert!(Error::DeadlineExceeded.is_cancellation());
        assert!(!Error::transport("boom").is_cancellation());
    }
}
