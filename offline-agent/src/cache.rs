//! Versioned Cache Stores
//!
//! A [`CacheStorage`] holds any number of named [`Cache`] stores, each a
//! request-to-response mapping. Stores are created lazily on first open and
//! destroyed wholesale when a new cache generation activates. The handle is
//! cheap to clone and shared across all concurrently handled events; reads
//! and writes suspend on the inner lock.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::trace;
use tokio::sync::RwLock;

use crate::http::{Request, Response};

/// Cache error types.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// Cache store not found.
    #[error("cache store not found: {0}")]
    NotFound(String),
    /// Underlying storage failure.
    #[error("cache storage error: {0}")]
    Storage(String),
}

/// A cached request-response pair.
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The request snapshot.
    request: Request,
    /// The response snapshot.
    response: Response,
    /// Body size in bytes.
    size: usize,
}

impl CacheEntry {
    fn new(request: Request, response: Response) -> Self {
        let size = response.body_len();
        Self {
            request,
            response,
            size,
        }
    }
}

/// A single named cache store.
///
/// At most one entry exists per request key; writes overwrite.
#[derive(Debug, Default)]
pub struct Cache {
    /// Cached entries by request key.
    entries: BTreeMap<String, CacheEntry>,
    /// Total body bytes held.
    total_size: usize,
}

impl Cache {
    fn new() -> Self {
        Self::default()
    }

    /// Look up a response for a request.
    pub fn match_request(&self, request: &Request) -> Option<Response> {
        self.entries
            .get(&make_key(request))
            .map(|e| e.response.clone())
    }

    /// Store a request/response pair, overwriting any previous entry.
    pub fn put(&mut self, request: Request, response: Response) {
        let key = make_key(&request);
        let entry = CacheEntry::new(request, response);
        let size = entry.size;

        if let Some(old) = self.entries.remove(&key) {
            self.total_size -= old.size;
        }
        self.entries.insert(key, entry);
        self.total_size += size;
    }

    /// Remove a cached request. Returns whether an entry existed.
    pub fn delete(&mut self, request: &Request) -> bool {
        if let Some(entry) = self.entries.remove(&make_key(request)) {
            self.total_size -= entry.size;
            true
        } else {
            false
        }
    }

    /// All cached request snapshots.
    pub fn keys(&self) -> Vec<Request> {
        self.entries.values().map(|e| e.request.clone()).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total body bytes held.
    pub fn size(&self) -> usize {
        self.total_size
    }
}

/// Make a cache key from a request.
///
/// The key is the (method, URL) tuple; only GET requests ever reach the
/// store in practice, but the method is kept in the key so a store can
/// never conflate methods.
fn make_key(request: &Request) -> String {
    format!("{}:{}", request.method.as_str(), request.url)
}

/// Shared handle to the cache stores.
///
/// Clones share the same underlying map. The platform store primitive is
/// assumed to serialize concurrent access; here that is the inner `RwLock`.
#[derive(Debug, Clone, Default)]
pub struct CacheStorage {
    inner: Arc<RwLock<BTreeMap<String, Cache>>>,
}

impl CacheStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a cache store, creating it if absent.
    pub async fn open(&self, name: &str) {
        let mut stores = self.inner.write().await;
        if !stores.contains_key(name) {
            trace!("cache: creating store '{name}'");
            stores.insert(name.to_string(), Cache::new());
        }
    }

    /// Check whether a store exists.
    pub async fn has(&self, name: &str) -> bool {
        self.inner.read().await.contains_key(name)
    }

    /// Delete a whole store. Returns whether it existed.
    pub async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        let mut stores = self.inner.write().await;
        Ok(stores.remove(name).is_some())
    }

    /// Names of all existing stores.
    pub async fn keys(&self) -> Vec<String> {
        self.inner.read().await.keys().cloned().collect()
    }

    /// Look up a response in a named store.
    pub async fn match_in(&self, name: &str, request: &Request) -> Option<Response> {
        let stores = self.inner.read().await;
        let hit = stores.get(name).and_then(|c| c.match_request(request));
        match &hit {
            Some(resp) => trace!(
                "cache: HIT store='{name}' url='{}' ({} bytes)",
                request.url,
                resp.body_len()
            ),
            None => trace!("cache: MISS store='{name}' url='{}'", request.url),
        }
        hit
    }

    /// Store a request/response pair, creating the store if absent.
    pub async fn put(
        &self,
        name: &str,
        request: Request,
        response: Response,
    ) -> Result<(), CacheError> {
        let mut stores = self.inner.write().await;
        let cache = stores.entry(name.to_string()).or_insert_with(Cache::new);
        trace!(
            "cache: PUT store='{name}' url='{}' ({} bytes)",
            request.url,
            response.body_len()
        );
        cache.put(request, response);
        Ok(())
    }

    /// Number of entries in a named store (0 when absent).
    pub async fn entry_count(&self, name: &str) -> usize {
        self.inner
            .read()
            .await
            .get(name)
            .map(|c| c.len())
            .unwrap_or(0)
    }

    /// Cached request snapshots in a named store.
    pub async fn requests_in(&self, name: &str) -> Vec<Request> {
        self.inner
            .read()
            .await
            .get(name)
            .map(|c| c.keys())
            .unwrap_or_default()
    }
}
