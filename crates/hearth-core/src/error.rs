//! Typed failures at the dispatch boundary
//!
//! Every variant is absorbed by the dispatcher and normalized into a
//! degraded envelope; nothing here reaches the HTTP caller as a fault.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The remote-execution collaborator could not be constructed
    /// (no API key and no local endpoint configured).
    #[error("dispatcher not configured: {0}")]
    Misconfigured(String),

    /// All execution permits are in use; the request was rejected rather
    /// than queued without bound.
    #[error("executor saturated ({limit} requests in flight)")]
    Saturated { limit: usize },

    /// The remote call exceeded the configured deadline.
    #[error("remote execution timed out after {0}s")]
    Timeout(u64),

    /// The remote call itself failed (network, auth, malformed output).
    #[error(transparent)]
    Remote(#[from] anyhow::Error),
}
