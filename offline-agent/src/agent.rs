//! The Agent
//!
//! Wires the cache store, interceptor, lifecycle controller and auxiliary
//! handlers together and maps each event kind to its handler. The hosting
//! runtime owns the event loop and delivers [`AgentEvent`]s; the agent
//! never fails an event: every degraded path resolves to logging plus a
//! best-effort outcome.

use std::sync::Arc;

use log::{debug, error, info};

use crate::cache::CacheStorage;
use crate::clients::ClientRegistry;
use crate::config::AgentConfig;
use crate::events::{AgentEvent, ControlMessage};
use crate::lifecycle::{AgentState, LifecycleController};
use crate::net::NetworkFetch;
use crate::notifications::{build_push_notification, NotificationCenter, ACTION_EXPLORE};
use crate::precache::PrecacheReport;
use crate::strategy::{FetchInterceptor, FetchResult};
use crate::sync::{handle_sync, SyncOutcome, UploadQueue};

/// How an event was resolved. Informational: no variant is an error to
/// the host.
#[derive(Debug)]
pub enum EventOutcome {
    /// Install completed (precache report attached).
    Installed(PrecacheReport),
    /// Activation completed.
    Activated,
    /// Fetch resolved (response or passthrough).
    Fetch(FetchResult),
    /// A recognized control message was applied.
    MessageAccepted,
    /// Push displayed as this notification.
    NotificationShown(u64),
    /// Notification click processed.
    NotificationClosed,
    /// Sync signal resolved.
    Sync(SyncOutcome),
    /// Event carried nothing actionable.
    Ignored,
}

/// The offline-caching agent.
pub struct Agent {
    config: Arc<AgentConfig>,
    cache: CacheStorage,
    interceptor: FetchInterceptor,
    lifecycle: LifecycleController,
    clients: ClientRegistry,
    notifications: NotificationCenter,
    upload_queue: Option<Arc<dyn UploadQueue>>,
}

impl Agent {
    /// Create an agent over the given network seam.
    pub fn new(config: AgentConfig, network: Arc<dyn NetworkFetch>) -> Self {
        let config = Arc::new(config);
        let cache = CacheStorage::new();
        info!("agent: loaded, cache version '{}'", config.cache_name);

        Self {
            interceptor: FetchInterceptor::new(config.clone(), cache.clone(), network.clone()),
            lifecycle: LifecycleController::new(config.clone(), cache.clone(), network),
            clients: ClientRegistry::new(),
            notifications: NotificationCenter::new(),
            upload_queue: None,
            cache,
            config,
        }
    }

    /// Attach the pending-upload queue collaborator.
    pub fn with_upload_queue(mut self, queue: Arc<dyn UploadQueue>) -> Self {
        self.upload_queue = Some(queue);
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AgentState {
        self.lifecycle.state()
    }

    /// The active configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// The shared cache storage handle.
    pub fn cache(&self) -> &CacheStorage {
        &self.cache
    }

    /// Open client pages.
    pub fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    /// Open client pages (mutable; the host registers page opens/closes).
    pub fn clients_mut(&mut self) -> &mut ClientRegistry {
        &mut self.clients
    }

    /// Displayed notifications.
    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Await all in-flight background cache writes.
    pub async fn flush_writes(&self) {
        self.interceptor.flush_writes().await;
    }

    /// Dispatch one event to its handler.
    pub async fn handle_event(&mut self, event: AgentEvent) -> EventOutcome {
        debug!("agent: {:?} event", event.kind());
        match event {
            AgentEvent::Install => self.on_install().await,
            AgentEvent::Activate => self.on_activate().await,
            AgentEvent::Fetch(request) => {
                EventOutcome::Fetch(self.interceptor.intercept(&request).await)
            }
            AgentEvent::Message(payload) => self.on_message(payload).await,
            AgentEvent::Push(payload) => {
                let notification =
                    build_push_notification(&self.config.notification, payload.as_deref());
                let id = self.notifications.show(notification).await;
                EventOutcome::NotificationShown(id)
            }
            AgentEvent::NotificationClick { id, action } => {
                self.notifications.close(id);
                if action.as_deref() == Some(ACTION_EXPLORE) {
                    self.clients.open_or_focus("/");
                }
                EventOutcome::NotificationClosed
            }
            AgentEvent::Sync { tag } => {
                let queue = self.upload_queue.as_deref();
                EventOutcome::Sync(handle_sync(&tag, queue).await)
            }
        }
    }

    async fn on_install(&mut self) -> EventOutcome {
        let report = match self.lifecycle.install().await {
            Ok(report) => report,
            Err(e) => {
                error!("agent: install out of order: {e}");
                return EventOutcome::Ignored;
            }
        };

        // A complete precache requested immediate activation: run it now
        // instead of waiting for the old generation to release control.
        if self.lifecycle.skip_waiting_requested() {
            if let Err(e) = self.lifecycle.activate(&mut self.clients).await {
                error!("agent: immediate activation failed: {e}");
            }
        }
        EventOutcome::Installed(report)
    }

    async fn on_activate(&mut self) -> EventOutcome {
        match self.lifecycle.activate(&mut self.clients).await {
            Ok(()) => EventOutcome::Activated,
            Err(e) => {
                error!("agent: activate out of order: {e}");
                EventOutcome::Ignored
            }
        }
    }

    async fn on_message(&mut self, payload: serde_json::Value) -> EventOutcome {
        match ControlMessage::parse(&payload) {
            Some(ControlMessage::SkipWaiting) => {
                if self.lifecycle.skip_waiting() {
                    if let Err(e) = self.lifecycle.activate(&mut self.clients).await {
                        error!("agent: skip-waiting activation failed: {e}");
                    }
                }
                EventOutcome::MessageAccepted
            }
            None => {
                debug!("agent: ignoring unrecognized message: {payload}");
                EventOutcome::Ignored
            }
        }
    }
}
