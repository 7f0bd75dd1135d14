//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (waits ordered, jitter factor sane, timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::ClientConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("retry.wait_min_ms ({min}) exceeds retry.wait_max_ms ({max})")]
    WaitRange { min: u64, max: u64 },

    #[error("retry.jitter_factor must be a finite number >= 1.0, got {0}")]
    JitterFactor(f64),

    #[error("transport.connect_secs must be greater than zero")]
    ConnectTimeout,

    #[error("observability.log_level '{0}' is not a valid filter")]
    LogLevel(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let retry = &config.retry;
    if retry.wait_min_ms > retry.wait_max_ms {
        errors.push(ValidationError::WaitRange {
            min: retry.wait_min_ms,
            max: retry.wait_max_ms,
        });
    }
    if !retry.jitter_factor.is_finite() || retry.jitter_factor < 1.0 {
        errors.push(ValidationError::JitterFactor(retry.jitter_factor));
    }

    if config.transport.connect_secs == 0 {
        errors.push(ValidationError::ConnectTimeout);
    }

    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ClientConfig::default();
        config.retry.wait_min_ms = 5_000;
        config.retry.wait_max_ms = 100;
        config.retry.jitter_factor = 0.5;
        config.transport.connect_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0], ValidationError::WaitRange { min: 5_000, max: 100 });
        assert_eq!(errors[1], ValidationError::JitterFactor(0.5));
        assert_eq!(errors[2], ValidationError::ConnectTimeout);
    }

    #[test]
    fn test_zero_retries_is_valid() {
        let mut config = ClientConfig::default();
        config.retry.max_retries = 0;
        config.retry.wait_min_ms = 0;
        config.retry.wait_max_ms = 0;
        assert!(validate_config(&config).is_ok());
    }
}
