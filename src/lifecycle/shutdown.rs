//! Shutdown coordination.

use tokio_util::sync::CancellationToken;

use crate::http::context::Context;

/// Coordinator that cancels every call started under it.
///
/// Calls issued with a context from [`Shutdown::context`] abort with
/// `Error::Cancelled` once [`Shutdown::trigger`] runs.
pub struct Shutdown {
    root: Context,
    token: CancellationToken,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (root, token) = Context::background().with_cancel();
        Self { root, token }
    }

    /// A context for one call, cancelled when shutdown triggers.
    pub fn context(&self) -> Context {
        self.root.child()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
