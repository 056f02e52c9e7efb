//! Client Windows
//!
//! Tracks the open client pages the agent can control, focus, or open.
//! The registry stands in for the hosting runtime's window table; the
//! notification-click handler routes through it to reach the app root.

use log::debug;

/// An open client page.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    /// Unique client ID.
    pub id: u64,
    /// URL the client is showing.
    pub url: String,
    /// Whether the client is focused.
    pub focused: bool,
    /// Whether this agent controls the client.
    pub controlled: bool,
}

/// Registry of open clients.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: Vec<ClientInfo>,
    next_id: u64,
}

impl ClientRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an open page (uncontrolled, unfocused).
    pub fn add(&mut self, url: impl Into<String>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.clients.push(ClientInfo {
            id,
            url: url.into(),
            focused: false,
            controlled: false,
        });
        id
    }

    /// Get a client by ID.
    pub fn get(&self, id: u64) -> Option<&ClientInfo> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// All clients.
    pub fn all(&self) -> &[ClientInfo] {
        &self.clients
    }

    /// Open a window at `url`, or focus an existing one already there.
    /// Returns the client ID.
    pub fn open_or_focus(&mut self, url: &str) -> u64 {
        if let Some(existing) = self.clients.iter().position(|c| c.url == url) {
            let id = self.clients[existing].id;
            for client in &mut self.clients {
                client.focused = client.id == id;
            }
            debug!("clients: focused existing window {id} at '{url}'");
            return id;
        }

        let id = self.add(url);
        for client in &mut self.clients {
            client.focused = client.id == id;
        }
        debug!("clients: opened window {id} at '{url}'");
        id
    }

    /// Take control of every open client immediately, without waiting for
    /// navigation. Returns how many clients are now controlled.
    pub fn claim(&mut self) -> usize {
        for client in &mut self.clients {
            client.controlled = true;
        }
        self.clients.len()
    }

    /// Remove a client (page closed). Returns whether it existed.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.clients.len();
        self.clients.retain(|c| c.id != id);
        self.clients.len() != before
    }
}
