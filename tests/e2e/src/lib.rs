//! Test fixtures for the end-to-end agent scenarios.
//!
//! The central piece is [`MockNetwork`], a scriptable [`NetworkFetch`]
//! implementation: per-URL responses, a global connectivity switch that
//! can be flipped mid-test, and per-URL call counting so tests can assert
//! that a request never touched the network.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use offline_agent::{FetchError, NetworkFetch, Request, Response, ResponseType};

/// What the mock network answers for one URL.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Answer with this status/type/body.
    Respond {
        status: u16,
        response_type: ResponseType,
        body: Vec<u8>,
    },
    /// Fail as if the host were unreachable.
    Unreachable,
}

/// Scriptable network double.
#[derive(Default)]
pub struct MockNetwork {
    scripts: Mutex<BTreeMap<String, Scripted>>,
    offline: AtomicBool,
    calls: Mutex<BTreeMap<String, usize>>,
}

impl MockNetwork {
    /// A network that answers 200/Basic for every URL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a specific answer for a URL.
    pub fn script(&self, url: &str, scripted: Scripted) {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), scripted);
    }

    /// Script a plain 200 same-origin body for a URL.
    pub fn serve(&self, url: &str, body: &[u8]) {
        self.script(
            url,
            Scripted::Respond {
                status: 200,
                response_type: ResponseType::Basic,
                body: body.to_vec(),
            },
        );
    }

    /// Flip global connectivity.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// How many times a URL was fetched.
    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    /// Total fetches across all URLs.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl NetworkFetch for MockNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(request.url.clone())
            .or_insert(0) += 1;

        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::Connection(request.url.clone()));
        }

        let scripted = self.scripts.lock().unwrap().get(&request.url).cloned();
        match scripted {
            Some(Scripted::Unreachable) => Err(FetchError::Connection(request.url.clone())),
            Some(Scripted::Respond {
                status,
                response_type,
                body,
            }) => Ok(Response::new(status)
                .with_response_type(response_type)
                .with_url(request.url.clone())
                .with_body(body)),
            None => Ok(Response::new(200)
                .with_response_type(ResponseType::Basic)
                .with_url(request.url.clone())
                .with_body(format!("default body of {}", request.url).into_bytes())),
        }
    }
}
