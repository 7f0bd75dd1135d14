//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every Context handed out is cancelled
//!             → in-flight attempts and backoff sleeps return Error::Cancelled
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
