//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated)
//!     → RetryClient::from_settings (transport + RetryConfig)
//!
//! Between calls:
//!     RetryClient setters / apply_settings
//!     → atomic swap of the client's RetryConfig
//!     → next call observes new config
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    BackoffKind, ClientConfig, LogFormat, ObservabilityConfig, RetryPolicyKind, RetrySettings,
    TransportConfig,
};
pub use validation::{validate_config, ValidationError};
