//! Network Collaborator
//!
//! The agent never talks to a network stack directly; the hosting runtime
//! supplies an implementation of [`NetworkFetch`]. An `Err` from `fetch`
//! means the network itself failed (no connectivity, DNS failure, reset);
//! HTTP error statuses are successful fetches and come back as `Ok`
//! responses.

use async_trait::async_trait;

use crate::http::{Request, Response};

/// Network fetch failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// Could not reach the host at all.
    #[error("connection failed for {0}")]
    Connection(String),
    /// Request timed out.
    #[error("request timeout for {0}")]
    Timeout(String),
    /// Reached the host but the response is unusable for the caller's
    /// purpose (used by precache for non-200 manifest entries).
    #[error("HTTP error: {status} for {url}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// URL that failed.
        url: String,
    },
}

/// Network fetch seam.
///
/// Implementations must be safe to call from concurrently handled events.
#[async_trait]
pub trait NetworkFetch: Send + Sync {
    /// Perform a network fetch for the given request.
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}
