//! Install-time Precache
//!
//! Fetches every manifest URL and stores it under the current version tag.
//! A cache generation is all-or-nothing: if any entry fails to fetch with
//! HTTP 200, the partially populated store is rolled back (best effort)
//! and the failures are reported. The install signal itself still
//! completes; precache failure never blocks installation.

use log::{debug, error, info, warn};

use crate::cache::CacheStorage;
use crate::config::AgentConfig;
use crate::http::{Request, Response};
use crate::net::{FetchError, NetworkFetch};

/// A manifest entry that could not be cached.
#[derive(Debug, Clone)]
pub struct PrecacheFailure {
    /// The manifest URL.
    pub url: String,
    /// Why it failed.
    pub error: FetchError,
}

/// Outcome of a precache run.
#[derive(Debug, Clone, Default)]
pub struct PrecacheReport {
    /// Manifest entries attempted.
    pub attempted: usize,
    /// Entries fetched and stored before any rollback.
    pub stored: usize,
    /// Entries that failed.
    pub failures: Vec<PrecacheFailure>,
    /// Whether the partial store was rolled back after a failure.
    pub rolled_back: bool,
}

impl PrecacheReport {
    /// Whether every manifest entry was fetched and stored.
    pub fn complete(&self) -> bool {
        self.failures.is_empty() && self.stored == self.attempted
    }
}

/// Fetch and store the whole precache manifest under the current version
/// tag.
///
/// Entries are fetched in manifest order. Each must come back with HTTP
/// 200; any other status or a network failure marks the entry failed. The
/// caller decides what an incomplete report means for the lifecycle.
pub async fn precache(
    storage: &CacheStorage,
    network: &dyn NetworkFetch,
    config: &AgentConfig,
) -> PrecacheReport {
    let store = config.cache_name.as_str();
    storage.open(store).await;
    debug!("precache: store '{store}' open, {} entries", config.precache_manifest.len());

    let mut report = PrecacheReport {
        attempted: config.precache_manifest.len(),
        ..PrecacheReport::default()
    };

    for url in &config.precache_manifest {
        let request = Request::get(url.clone());
        match network.fetch(&request).await {
            Ok(response) if response.status == 200 => {
                if let Err(e) = store_entry(storage, store, request, response).await {
                    warn!("precache: store failed for '{url}': {e}");
                    report.failures.push(PrecacheFailure {
                        url: url.clone(),
                        error: e,
                    });
                } else {
                    report.stored += 1;
                }
            }
            Ok(response) => {
                warn!("precache: '{url}' answered {}", response.status);
                report.failures.push(PrecacheFailure {
                    url: url.clone(),
                    error: FetchError::Http {
                        status: response.status,
                        url: url.clone(),
                    },
                });
            }
            Err(e) => {
                warn!("precache: fetch failed for '{url}': {e}");
                report.failures.push(PrecacheFailure {
                    url: url.clone(),
                    error: e,
                });
            }
        }
    }

    if report.complete() {
        info!("precache: {} entries cached under '{store}'", report.stored);
    } else {
        // All-or-nothing: drop the partial generation so no request is
        // ever served from a half-populated store.
        error!(
            "precache: {}/{} entries failed, rolling back '{store}'",
            report.failures.len(),
            report.attempted
        );
        match storage.delete(store).await {
            Ok(_) => report.rolled_back = true,
            Err(e) => warn!("precache: rollback of '{store}' failed: {e}"),
        }
    }

    report
}

async fn store_entry(
    storage: &CacheStorage,
    store: &str,
    request: Request,
    response: Response,
) -> Result<(), FetchError> {
    let url = request.url.clone();
    storage
        .put(store, request, response)
        .await
        .map_err(|e| FetchError::Connection(format!("{url}: {e}")))
}
