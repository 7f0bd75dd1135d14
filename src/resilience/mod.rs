//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! RetryClient::execute
//!     → executor.rs (rewind body, send, decide, drain, wait, repeat)
//!     → retries.rs (should this outcome be retried?)
//!     → backoff.rs (how long until the next attempt?)
//! ```
//!
//! # Design Decisions
//! - Policies are strategy values (`Arc<dyn RetryPolicy>`, `Arc<dyn BackoffPolicy>`)
//! - Exhaustion reports the attempt count, not the last transient error
//! - Backoff sleeps are cancellable through the request context

pub mod backoff;
pub mod executor;
pub mod retries;

pub use backoff::{BackoffPolicy, ConstantBackoff, ExponentialBackoff, JitteredBackoff};
pub use executor::{RetryConfig, RetryExecutor, DEFAULT_RETRY_MAX, DEFAULT_RETRY_WAIT_MAX, DEFAULT_RETRY_WAIT_MIN};
pub use retries::{AttemptOutcome, DefaultRetryPolicy, RetryDecision, RetryPolicy, ServerErrorRetryPolicy};
