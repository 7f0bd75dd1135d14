//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! resilience::executor produces:
//!     → tracing events (attempt failures, retry decisions)
//!     → metrics.rs (attempt, retry, exhaustion counters)
//!
//! Consumers:
//!     → logging.rs subscriber (stderr, pretty or JSON)
//!     → whatever metrics recorder the application installs
//! ```

pub mod logging;
pub mod metrics;
