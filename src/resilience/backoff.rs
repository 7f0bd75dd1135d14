//! Backoff policies.
//!
//! # Responsibilities
//! - Compute how long to wait before the next attempt
//!
//! # Design Decisions
//! - Policies are pure functions of (min, max, attempt, last response)
//! - `attempt` is zero-based: 0 is the wait after the first attempt
//! - Overflow clamps to max instead of wrapping or panicking

use std::time::Duration;

use rand::Rng;

use crate::http::response::Response;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Computes the wait before the next attempt.
pub trait BackoffPolicy: Send + Sync {
    fn wait(&self, min: Duration, max: Duration, attempt: u32, last: Option<&Response>) -> Duration;
}

impl<F> BackoffPolicy for F
where
    F: Fn(Duration, Duration, u32, Option<&Response>) -> Duration + Send + Sync,
{
    fn wait(&self, min: Duration, max: Duration, attempt: u32, last: Option<&Response>) -> Duration {
        self(min, max, attempt, last)
    }
}

/// `min * 2^attempt`, clamped to `max`.
pub fn exponential(min: Duration, max: Duration, attempt: u32) -> Duration {
    let base = min.as_nanos();
    if base == 0 {
        return Duration::ZERO;
    }
    // Shifting past the leading zeros would overflow.
    if attempt > base.leading_zeros() {
        return max;
    }

    let nanos = base << attempt;
    if nanos > max.as_nanos() {
        return max;
    }
    Duration::new((nanos / NANOS_PER_SEC) as u64, (nanos % NANOS_PER_SEC) as u32)
}

/// Exponential backoff without jitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExponentialBackoff;

impl BackoffPolicy for ExponentialBackoff {
    fn wait(&self, min: Duration, max: Duration, attempt: u32, _last: Option<&Response>) -> Duration {
        exponential(min, max, attempt)
    }
}

/// Exponential backoff with jitter.
///
/// For a computed wait `D` the actual wait falls anywhere in `[D / factor, D]`, which
/// spreads out callers that failed at the same moment. A factor of 1.0 or less
/// disables jitter.
#[derive(Debug, Clone, Copy)]
pub struct JitteredBackoff {
    factor: f64,
}

impl JitteredBackoff {
    pub fn new(factor: f64) -> Self {
        let factor = if factor.is_finite() { factor.max(1.0) } else { 1.0 };
        Self { factor }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl Default for JitteredBackoff {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl BackoffPolicy for JitteredBackoff {
    fn wait(&self, min: Duration, max: Duration, attempt: u32, _last: Option<&Response>) -> Duration {
        let upper = exponential(min, max, attempt);
        if self.factor <= 1.0 || upper.is_zero() {
            return upper;
        }
        let lower = upper.div_f64(self.factor);
        rand::thread_rng().gen_range(lower..=upper)
    }
}

/// Always waits `min`, clamped to `max`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantBackoff;

impl BackoffPolicy for ConstantBackoff {
    fn wait(&self, min: Duration, max: Duration, _attempt: u32, _last: Option<&Response>) -> Duration {
        min.min(max)
    }
}
