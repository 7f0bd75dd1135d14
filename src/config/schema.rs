//! Configuration schema definitions.
//!
//! This module defines the configuration file structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the retrying client.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Retry and backoff settings.
    pub retry: RetrySettings,

    /// Transport (connection pool) settings.
    pub transport: TransportConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Which retry policy to install.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RetryPolicyKind {
    /// Retry transport errors, status 0 and 503.
    #[default]
    Default,
    /// Retry transport errors, status 0, 429 and most 5xx.
    ServerErrors,
}

/// Which backoff policy to install.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
    /// `min * 2^attempt`, capped at max.
    #[default]
    Exponential,
    /// Exponential with random jitter.
    Jittered,
    /// Always wait the minimum.
    Constant,
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetrySettings {
    /// Minimum wait between attempts in milliseconds.
    pub wait_min_ms: u64,

    /// Maximum wait between attempts in milliseconds.
    pub wait_max_ms: u64,

    /// Maximum number of retries (total attempts = max_retries + 1).
    pub max_retries: u32,

    /// Retry policy.
    pub policy: RetryPolicyKind,

    /// Backoff policy.
    pub backoff: BackoffKind,

    /// Jitter factor for the jittered backoff. Waits fall in `[d / factor, d]`.
    pub jitter_factor: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            wait_min_ms: 1_000,
            wait_max_ms: 30_000,
            max_retries: 4,
            policy: RetryPolicyKind::Default,
            backoff: BackoffKind::Exponential,
            jitter_factor: 2.0,
        }
    }
}

/// Transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TransportConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// How long an idle pooled connection is kept, in seconds.
    pub pool_idle_secs: u64,

    /// Maximum idle connections kept per host.
    pub pool_max_idle_per_host: usize,

    /// Set TCP_NODELAY on new connections.
    pub tcp_nodelay: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_secs: 30,
            pool_idle_secs: 90,
            pool_max_idle_per_host: 32,
            tcp_nodelay: true,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
