//! Retry policies.
//!
//! # Responsibilities
//! - Decide, after every attempt, whether the call should be retried
//! - Optionally supply the error the caller sees when retrying stops
//!
//! # Design Decisions
//! - Policies are pure: no logging, no mutation of the outcome
//! - Any `Fn(&AttemptOutcome) -> RetryDecision` closure is a policy

use http::StatusCode;

use crate::error::{Error, TransportError};
use crate::http::response::Response;

/// What a single attempt produced: a response or a transport failure.
pub type AttemptOutcome = Result<Response, TransportError>;

/// The verdict of a retry policy for one attempt.
#[derive(Debug, Default)]
pub struct RetryDecision {
    /// Whether another attempt should be made.
    pub retry: bool,
    /// Error returned in place of the transport error when retrying stops.
    pub error: Option<Error>,
}

impl RetryDecision {
    pub fn stop() -> Self {
        Self { retry: false, error: None }
    }

    pub fn stop_with(error: Error) -> Self {
        Self { retry: false, error: Some(error) }
    }

    pub fn retry() -> Self {
        Self { retry: true, error: None }
    }

    pub fn retry_with(error: Error) -> Self {
        Self { retry: true, error: Some(error) }
    }
}

/// Decides whether an attempt should be retried.
pub trait RetryPolicy: Send + Sync {
    fn evaluate(&self, outcome: &AttemptOutcome) -> RetryDecision;
}

impl<F> RetryPolicy for F
where
    F: Fn(&AttemptOutcome) -> RetryDecision + Send + Sync,
{
    fn evaluate(&self, outcome: &AttemptOutcome) -> RetryDecision {
        self(outcome)
    }
}

/// Retries connection-level failures and 503 Service Unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRetryPolicy;

impl DefaultRetryPolicy {
    /// Status codes this policy retries. 0 stands for "no status received".
    pub fn is_retryable_status(code: u16) -> bool {
        code == 0 || code == StatusCode::SERVICE_UNAVAILABLE.as_u16()
    }
}

impl RetryPolicy for DefaultRetryPolicy {
    fn evaluate(&self, outcome: &AttemptOutcome) -> RetryDecision {
        match outcome {
            Err(err) => RetryDecision::retry_with(Error::Transport(err.clone())),
            Ok(response) if Self::is_retryable_status(response.status().as_u16()) => {
                RetryDecision::retry()
            }
            Ok(_) => RetryDecision::stop(),
        }
    }
}

/// Retries connection-level failures, 429 and server errors.
///
/// 501 Not Implemented and 505 HTTP Version Not Supported are left alone since
/// repeating the request cannot change the answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerErrorRetryPolicy;

impl ServerErrorRetryPolicy {
    pub fn is_retryable_status(code: u16) -> bool {
        match code {
            0 | 429 => true,
            501 | 505 => false,
            500..=599 => true,
            _ => false,
        }
    }
}

impl RetryPolicy for ServerErrorRetryPolicy {
    fn evaluate(&self, outcome: &AttemptOutcome) -> RetryDecision {
        match outcome {
            Err(err) => RetryDecision::retry_with(Error::Transport(err.clone())),
            Ok(response) if Self::is_retryable_status(response.status().as_u16()) => {
                RetryDecision::retry()
            }
            Ok(_) => RetryDecision::stop(),
        }
    }
}
