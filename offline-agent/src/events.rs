//! Agent Events
//!
//! The named events the hosting runtime delivers, with their payloads, and
//! the one-way control-message protocol from client pages. The dispatcher
//! itself belongs to the host; the agent only maps event kind → handler.

use serde::Deserialize;

use crate::http::Request;

/// Event kind identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Install signal.
    Install,
    /// Activate signal.
    Activate,
    /// Intercepted fetch.
    Fetch,
    /// Message from a client page.
    Message,
    /// Push notification delivery.
    Push,
    /// Click on a displayed notification.
    NotificationClick,
    /// Background sync signal.
    Sync,
}

/// An event with its payload.
#[derive(Debug)]
pub enum AgentEvent {
    /// Install signal.
    Install,
    /// Activate signal.
    Activate,
    /// Intercepted fetch.
    Fetch(Request),
    /// Message from a client page (arbitrary JSON).
    Message(serde_json::Value),
    /// Push delivery with optional opaque payload.
    Push(Option<Vec<u8>>),
    /// Click on a displayed notification.
    NotificationClick {
        /// The notification clicked.
        id: u64,
        /// Chosen action, if a button was used.
        action: Option<String>,
    },
    /// Background sync signal.
    Sync {
        /// The sync tag.
        tag: String,
    },
}

impl AgentEvent {
    /// The kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Install => EventKind::Install,
            Self::Activate => EventKind::Activate,
            Self::Fetch(_) => EventKind::Fetch,
            Self::Message(_) => EventKind::Message,
            Self::Push(_) => EventKind::Push,
            Self::NotificationClick { .. } => EventKind::NotificationClick,
            Self::Sync { .. } => EventKind::Sync,
        }
    }
}

/// Control messages a client page may send. The protocol is one-way; no
/// response payload exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// Force the waiting generation to activate immediately.
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
}

impl ControlMessage {
    /// Parse a message payload. Unknown or malformed payloads yield
    /// `None` and are ignored by the dispatch.
    pub fn parse(payload: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(payload.clone()).ok()
    }
}
