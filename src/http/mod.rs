//! HTTP client subsystem.
//!
//! # Data Flow
//! ```text
//! Request::new (context.rs, request.rs: validate method/target, wrap body)
//!     → client.rs (snapshot RetryConfig)
//!     → resilience::executor (attempt loop)
//!     → transport.rs (one attempt over hyper)
//!     → response.rs (drain discarded bodies / hand back the final one)
//! ```

pub mod client;
pub mod context;
pub mod request;
pub mod response;
pub mod transport;

pub use client::RetryClient;
pub use context::Context;
pub use request::{ReplayBody, ReplayableBody, Request};
pub use response::{Response, ResponseBody};
pub use transport::{HyperTransport, Transport};
