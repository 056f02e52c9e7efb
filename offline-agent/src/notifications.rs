//! Notifications
//!
//! Builds the fixed-shape notification shown for push payloads and tracks
//! displayed notifications so click events can close them. Payload content
//! is never validated: whatever text arrives becomes the body, and an
//! absent payload falls back to the configured default.

use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;

use crate::config::NotificationStyle;

/// Action identifier for "open the app".
pub const ACTION_EXPLORE: &str = "explore";
/// Action identifier for "dismiss".
pub const ACTION_CLOSE: &str = "close";

/// Vibration pattern used for every push notification.
const VIBRATE_PATTERN: [u32; 3] = [100, 50, 100];

/// A button on a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationAction {
    /// Action identifier reported on click.
    pub action: String,
    /// Button label.
    pub title: String,
    /// Button icon path.
    pub icon: Option<String>,
}

/// A notification descriptor.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Assigned when displayed (0 until then).
    pub id: u64,
    /// Title line.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Icon path.
    pub icon: Option<String>,
    /// Badge path.
    pub badge: Option<String>,
    /// Vibration pattern.
    pub vibrate: Vec<u32>,
    /// Action buttons.
    pub actions: Vec<NotificationAction>,
    /// Arrival timestamp (Unix millis).
    pub arrived_at: u64,
    /// Whether the notification has been closed.
    pub closed: bool,
}

/// Build the notification for a push payload.
///
/// The shape is fixed: configured title/icon/badge, the standard vibrate
/// pattern, and the two actions `explore` / `close`. The payload text (or
/// the default body when absent) passes through unparsed.
pub fn build_push_notification(style: &NotificationStyle, payload: Option<&[u8]>) -> Notification {
    let body = match payload {
        Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        None => style.default_body.clone(),
    };

    Notification {
        id: 0,
        title: style.title.clone(),
        body,
        icon: Some(style.icon.clone()),
        badge: Some(style.badge.clone()),
        vibrate: VIBRATE_PATTERN.to_vec(),
        actions: vec![
            NotificationAction {
                action: ACTION_EXPLORE.to_string(),
                title: "Ver detalles".to_string(),
                icon: Some(style.icon.clone()),
            },
            NotificationAction {
                action: ACTION_CLOSE.to_string(),
                title: "Cerrar".to_string(),
                icon: Some(style.icon.clone()),
            },
        ],
        arrived_at: unix_millis(),
        closed: false,
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Displayed notifications.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    shown: Vec<Notification>,
    next_id: u64,
}

impl NotificationCenter {
    /// Create an empty center.
    pub fn new() -> Self {
        Self::default()
    }

    /// Display a notification. The display surface is a suspension point
    /// in the hosting runtime; here the descriptor is recorded and given
    /// its ID.
    pub async fn show(&mut self, mut notification: Notification) -> u64 {
        self.next_id += 1;
        notification.id = self.next_id;
        debug!(
            "notifications: showing #{} '{}'",
            notification.id, notification.title
        );
        self.shown.push(notification);
        self.next_id
    }

    /// Close a notification. Returns whether it was open.
    pub fn close(&mut self, id: u64) -> bool {
        match self.shown.iter_mut().find(|n| n.id == id && !n.closed) {
            Some(notification) => {
                notification.closed = true;
                debug!("notifications: closed #{id}");
                true
            }
            None => false,
        }
    }

    /// Get a notification by ID.
    pub fn get(&self, id: u64) -> Option<&Notification> {
        self.shown.iter().find(|n| n.id == id)
    }

    /// All notifications ever shown (including closed ones).
    pub fn shown(&self) -> &[Notification] {
        &self.shown
    }
}
