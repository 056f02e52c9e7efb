//! Offline-Caching Agent
//!
//! A host-independent implementation of a browser-resident offline agent:
//! versioned cache stores, install-time precaching, a cache-first request
//! interception strategy with network and offline-page fallbacks, and the
//! install → activate → claim lifecycle with an explicit skip-waiting
//! override.
//!
//! The hosting runtime stays external: it owns the event loop and the real
//! network stack, delivers [`AgentEvent`]s to [`Agent::handle_event`], and
//! supplies the network through the [`NetworkFetch`] trait. Everything the
//! agent decides (what to cache, what to serve, which generations to reap)
//! lives here.
//!
//! ```no_run
//! use std::sync::Arc;
//! use offline_agent::{Agent, AgentConfig, AgentEvent, NetworkFetch};
//!
//! # async fn run(network: Arc<dyn NetworkFetch>) {
//! let mut agent = Agent::new(AgentConfig::default(), network);
//! agent.handle_event(AgentEvent::Install).await;
//! # }
//! ```

mod agent;
mod cache;
mod clients;
mod config;
mod events;
mod http;
mod lifecycle;
mod net;
mod notifications;
mod precache;
mod strategy;
mod sync;

pub use agent::{Agent, EventOutcome};
pub use cache::{Cache, CacheError, CacheStorage};
pub use clients::{ClientInfo, ClientRegistry};
pub use config::{AgentConfig, NotificationStyle};
pub use events::{AgentEvent, ControlMessage, EventKind};
pub use http::{Method, Request, Response, ResponseType};
pub use lifecycle::{AgentState, LifecycleController, LifecycleError};
pub use net::{FetchError, NetworkFetch};
pub use notifications::{
    build_push_notification, Notification, NotificationAction, NotificationCenter,
    ACTION_CLOSE, ACTION_EXPLORE,
};
pub use precache::{precache, PrecacheFailure, PrecacheReport};
pub use strategy::{
    synthetic_offline_response, FetchInterceptor, FetchResult, FetchSource, PassthroughReason,
};
pub use sync::{handle_sync, SyncError, SyncOutcome, UploadQueue, VIDEO_UPLOAD_TAG};
