//! The attempt loop.
//!
//! # State Machine
//! ```text
//! Attempting → Deciding → Returning
//!                       → Waiting → Attempting
//! ```
//!
//! # Responsibilities
//! - Rewind the replayable body before every attempt, including the first
//! - Send through the transport and ask the retry policy what to do
//! - Drain discarded responses so their connections can be reused
//! - Sleep for the backoff and stop after `max_retries + 1` attempts
//! - Abort promptly when the request context is cancelled

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::config::{BackoffKind, RetryPolicyKind, RetrySettings};
use crate::error::{Error, Result};
use crate::http::request::Request;
use crate::http::response::{drain, full, Response};
use crate::http::transport::Transport;
use crate::observability::metrics;
use crate::resilience::backoff::{BackoffPolicy, ConstantBackoff, ExponentialBackoff, JitteredBackoff};
use crate::resilience::retries::{DefaultRetryPolicy, RetryPolicy, ServerErrorRetryPolicy};

/// Minimum wait between attempts.
pub const DEFAULT_RETRY_WAIT_MIN: Duration = Duration::from_secs(1);

/// Maximum wait between attempts.
pub const DEFAULT_RETRY_WAIT_MAX: Duration = Duration::from_secs(30);

/// Maximum number of retries after the first attempt.
pub const DEFAULT_RETRY_MAX: u32 = 4;

/// Retry configuration used for a call.
#[derive(Clone)]
pub struct RetryConfig {
    pub wait_min: Duration,
    pub wait_max: Duration,
    pub max_retries: u32,
    pub retry_policy: Arc<dyn RetryPolicy>,
    pub backoff: Arc<dyn BackoffPolicy>,
}

impl RetryConfig {
    /// Build the runtime configuration described by a config file section.
    pub fn from_settings(settings: &RetrySettings) -> Self {
        let retry_policy: Arc<dyn RetryPolicy> = match settings.policy {
            RetryPolicyKind::Default => Arc::new(DefaultRetryPolicy),
            RetryPolicyKind::ServerErrors => Arc::new(ServerErrorRetryPolicy),
        };
        let backoff: Arc<dyn BackoffPolicy> = match settings.backoff {
            BackoffKind::Exponential => Arc::new(ExponentialBackoff),
            BackoffKind::Jittered => Arc::new(JitteredBackoff::new(settings.jitter_factor)),
            BackoffKind::Constant => Arc::new(ConstantBackoff),
        };

        Self {
            wait_min: Duration::from_millis(settings.wait_min_ms),
            wait_max: Duration::from_millis(settings.wait_max_ms),
            max_retries: settings.max_retries,
            retry_policy,
            backoff,
        }
    }

    /// Total attempts a call may make.
    pub fn max_attempts(&self) -> u64 {
        u64::from(self.max_retries) + 1
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            wait_min: DEFAULT_RETRY_WAIT_MIN,
            wait_max: DEFAULT_RETRY_WAIT_MAX,
            max_retries: DEFAULT_RETRY_MAX,
            retry_policy: Arc::new(DefaultRetryPolicy),
            backoff: Arc::new(ExponentialBackoff),
        }
    }
}

impl fmt::Debug for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("wait_min", &self.wait_min)
            .field("wait_max", &self.wait_max)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

/// Runs one call's attempt loop against a transport.
pub struct RetryExecutor {
    config: Arc<RetryConfig>,
    transport: Arc<dyn Transport>,
}

impl RetryExecutor {
    pub fn new(config: Arc<RetryConfig>, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Issue `request` until the policy is satisfied or attempts run out.
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let config = &*self.config;
        let ctx = request.context();
        let method = request.method();
        let url = request.url();
        for attempt in 0..=config.max_retries {
            if let Some(body) = request.body() {
                ctx.run(body.rewind()).await?.map_err(Error::BodyRewind)?;
            }

            metrics::record_attempt(method);
            let outgoing = request.to_attempt()?;
            let outcome = ctx.run(self.transport.send(outgoing)).await?;

            if let Err(err) = &outcome {
                tracing::error!(%method, %url, attempt, error = %err, "Request failed");
            }

            let decision = config.retry_policy.evaluate(&outcome);
            if !decision.retry {
                return match (outcome, decision.error) {
                    (_, Some(err)) => Err(err),
                    (Ok(response), None) => Ok(response),
                    (Err(err), None) => Err(Error::Transport(err)),
                };
            }

            let remaining = config.max_retries - attempt;
            if remaining == 0 {
                break;
            }

            // Keep the head for the backoff policy; the body goes back to the pool.
            let last = match outcome {
                Ok(response) => {
                    let (parts, body) = response.into_parts();
                    if let Err(e) = ctx.run(drain(body)).await? {
                        tracing::warn!(%method, %url, error = %e, "Error reading response body");
                        metrics::record_drain_failure();
                    }
                    Some(Response::from_parts(parts, full(Bytes::new())))
                }
                Err(_) => None,
            };

            let wait = config.backoff.wait(config.wait_min, config.wait_max, attempt, last.as_ref());
            tracing::debug!(
                %method,
                %url,
                status = last.as_ref().map(|r| r.status().as_u16()),
                wait = ?wait,
                remaining,
                "Retrying request"
            );
            metrics::record_retry(method);

            ctx.sleep(wait).await?;
        }

        metrics::record_exhausted(method);
        Err(Error::Exhausted {
            method: method.clone(),
            url: url.clone(),
            attempts: config.max_attempts(),
        })
    }
}
