//! Request Interceptor
//!
//! The per-request cache strategy: cache-first with background refill,
//! network fallback, offline page last. Every intercepted request resolves
//! to a response (a cached entry, a live response, or the offline
//! fallback) and no branch ever raises an error to the caller.
//!
//! Strategy, per request:
//! 1. Non-GET methods pass through untouched.
//! 2. URLs matching the realtime-service denylist pass through untouched.
//! 3. A cache hit is returned as-is; no freshness check, no network. An
//!    entry is trusted until its generation is reaped.
//! 4. On a miss, fetch from the network. A 200 same-origin response is
//!    duplicated and stored in the background while the original goes to
//!    the caller; anything else is returned uncached.
//! 5. If the network itself fails, the cached offline page is served, or a
//!    synthesized offline response when even that is missing.

use std::sync::{Arc, Mutex};

use log::{debug, trace, warn};
use tokio::task::JoinHandle;

use crate::cache::CacheStorage;
use crate::config::AgentConfig;
use crate::http::{Method, Request, Response, ResponseType};
use crate::net::NetworkFetch;

/// Why a request was not intercepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassthroughReason {
    /// Only GET requests are intercepted.
    NonGetMethod,
    /// URL matched the realtime-service denylist.
    RealtimeBypass,
}

/// Where an intercepted response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// Served from the cache store.
    Cache,
    /// Fetched live from the network.
    Network,
    /// The offline fallback document (cached or synthesized).
    OfflineFallback,
}

/// Result of intercepting a request.
#[derive(Debug)]
pub enum FetchResult {
    /// Not intercepted; the host performs its default network behavior.
    Passthrough(PassthroughReason),
    /// Intercepted and resolved.
    Response {
        /// The response to deliver.
        response: Response,
        /// Where it originated.
        source: FetchSource,
    },
}

impl FetchResult {
    /// The response, when the request was intercepted.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Response { response, .. } => Some(response),
            Self::Passthrough(_) => None,
        }
    }

    /// The source, when the request was intercepted.
    pub fn source(&self) -> Option<FetchSource> {
        match self {
            Self::Response { source, .. } => Some(*source),
            Self::Passthrough(_) => None,
        }
    }
}

/// The request interceptor.
pub struct FetchInterceptor {
    config: Arc<AgentConfig>,
    cache: CacheStorage,
    network: Arc<dyn NetworkFetch>,
    /// Background store-writes spawned by cache misses. Retained so the
    /// race between "response delivered" and "write completed" can be
    /// closed deterministically in tests via [`flush_writes`].
    ///
    /// [`flush_writes`]: FetchInterceptor::flush_writes
    pending_writes: Mutex<Vec<JoinHandle<()>>>,
}

impl FetchInterceptor {
    /// Create an interceptor over the given store and network seam.
    pub fn new(
        config: Arc<AgentConfig>,
        cache: CacheStorage,
        network: Arc<dyn NetworkFetch>,
    ) -> Self {
        Self {
            config,
            cache,
            network,
            pending_writes: Mutex::new(Vec::new()),
        }
    }

    /// Run the cache strategy for one request.
    ///
    /// Steps are strictly sequential within a request; across requests no
    /// ordering is guaranteed. Never returns an error: every branch
    /// resolves to a [`FetchResult`].
    pub async fn intercept(&self, request: &Request) -> FetchResult {
        if request.method != Method::Get {
            trace!(
                "fetch: passthrough {} '{}' (non-GET)",
                request.method.as_str(),
                request.url
            );
            return FetchResult::Passthrough(PassthroughReason::NonGetMethod);
        }

        if self.config.is_bypassed(&request.url) {
            trace!("fetch: passthrough '{}' (realtime bypass)", request.url);
            return FetchResult::Passthrough(PassthroughReason::RealtimeBypass);
        }

        let store = self.config.cache_name.as_str();
        if let Some(cached) = self.cache.match_in(store, request).await {
            debug!("fetch: '{}' from cache", request.url);
            return FetchResult::Response {
                response: cached,
                source: FetchSource::Cache,
            };
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.store_in_background(request.clone(), response.clone_response());
                } else {
                    trace!(
                        "fetch: '{}' not cacheable (status {}, {:?})",
                        request.url,
                        response.status,
                        response.response_type
                    );
                }
                FetchResult::Response {
                    response,
                    source: FetchSource::Network,
                }
            }
            Err(e) => {
                warn!("fetch: network failed for '{}': {e}, serving offline page", request.url);
                self.offline_fallback().await
            }
        }
    }

    /// Store a duplicated response without blocking response delivery.
    ///
    /// The write happens in a spawned task; a failure is logged and the
    /// already-delivered response is unaffected.
    fn store_in_background(&self, request: Request, response: Response) {
        let cache = self.cache.clone();
        let store = self.config.cache_name.clone();
        let handle = tokio::spawn(async move {
            let url = request.url.clone();
            if let Err(e) = cache.put(&store, request, response).await {
                warn!("fetch: background store of '{url}' failed: {e}");
            }
        });

        let mut pending = self.pending_writes.lock().unwrap_or_else(|e| e.into_inner());
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Await all in-flight background store-writes.
    ///
    /// The write contract is fire-and-forget; this barrier exists so tests
    /// and orderly shutdown can observe a quiescent store.
    pub async fn flush_writes(&self) {
        let handles = {
            let mut pending = self.pending_writes.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *pending)
        };
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("fetch: background store task failed: {e}");
            }
        }
    }

    /// Resolve the terminal offline branch.
    async fn offline_fallback(&self) -> FetchResult {
        let store = self.config.cache_name.as_str();
        let offline = Request::get(self.config.offline_url.clone());
        let response = match self.cache.match_in(store, &offline).await {
            Some(cached) => cached,
            None => {
                // The offline page itself never made it into the store
                // (failed precache); degrade to a defined synthesized
                // response instead of an undefined miss.
                warn!(
                    "fetch: offline page '{}' missing from '{store}', synthesizing",
                    self.config.offline_url
                );
                synthetic_offline_response()
            }
        };
        FetchResult::Response {
            response,
            source: FetchSource::OfflineFallback,
        }
    }
}

/// Minimal offline response used when the offline document is not cached.
pub fn synthetic_offline_response() -> Response {
    Response::new(503)
        .with_response_type(ResponseType::Basic)
        .with_header("Content-Type", "text/html; charset=utf-8")
        .with_body(
            b"<!DOCTYPE html><html><head><title>Offline</title></head>\
              <body><h1>Sin conexi\xc3\xb3n</h1>\
              <p>No hay conexi\xc3\xb3n a internet y esta p\xc3\xa1gina no \
              est\xc3\xa1 en cach\xc3\xa9.</p></body></html>"
                .to_vec(),
        )
}
