//! HTTP client that retries failed requests with backoff.
//!
//! Requests carry an optional replayable body that is rewound before every
//! attempt, a pluggable retry policy decides which outcomes are retried, and a
//! pluggable backoff policy decides how long to wait in between.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use http::{Context, ReplayBody, Request, Response, RetryClient};
pub use resilience::{BackoffPolicy, RetryConfig, RetryDecision, RetryPolicy};
