//! Agent Configuration
//!
//! All tunables are injected at construction: the version tag that names
//! the current cache generation, the precache manifest, the offline
//! fallback document, the realtime-service denylist and the notification
//! shape. Changing the version tag is the sole cache-invalidation lever:
//! a new tag makes the Activation Reaper discard every older generation.

use serde::Deserialize;

/// Fixed shape of push notifications shown by the agent.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NotificationStyle {
    /// Notification title.
    pub title: String,
    /// Icon path.
    pub icon: String,
    /// Badge path.
    pub badge: String,
    /// Body used when a push carries no payload.
    pub default_body: String,
}

impl Default for NotificationStyle {
    fn default() -> Self {
        Self {
            title: "PWA Visa".to_string(),
            icon: "/icon-192x192.png".to_string(),
            badge: "/badge-72x72.png".to_string(),
            default_body: "Nueva notificación".to_string(),
        }
    }
}

/// Agent configuration.
///
/// `cache_name` follows the `"{product}-v{semver}"` convention.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Version tag naming the current cache generation.
    pub cache_name: String,
    /// Path of the static offline fallback document. Must appear in the
    /// precache manifest, or the fallback path degenerates to a miss and
    /// a synthesized response is served instead.
    pub offline_url: String,
    /// Resources fetched and stored at install time, in order. Mixed
    /// same-origin paths and cross-origin CDN URLs.
    pub precache_manifest: Vec<String>,
    /// URL substrings identifying realtime/auth services that must never
    /// be intercepted or cached.
    pub bypass_patterns: Vec<String>,
    /// Push notification shape.
    pub notification: NotificationStyle,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            cache_name: "visa-pwa-v1.0.0".to_string(),
            offline_url: "/offline.html".to_string(),
            precache_manifest: vec![
                "/".to_string(),
                "/index.html".to_string(),
                "/cliente/".to_string(),
                "/cliente/index.html".to_string(),
                "/offline.html".to_string(),
                "https://cdn.tailwindcss.com".to_string(),
                "https://www.gstatic.com/firebasejs/10.7.0/firebase-app-compat.js".to_string(),
                "https://www.gstatic.com/firebasejs/10.7.0/firebase-auth-compat.js".to_string(),
                "https://www.gstatic.com/firebasejs/10.7.0/firebase-firestore-compat.js"
                    .to_string(),
                "/favicon.ico".to_string(),
            ],
            bypass_patterns: vec![
                "firebase".to_string(),
                "firestore".to_string(),
                "identitytoolkit".to_string(),
            ],
            notification: NotificationStyle::default(),
        }
    }
}

impl AgentConfig {
    /// Create a config with a custom version tag and otherwise default
    /// contents.
    pub fn with_cache_name(cache_name: impl Into<String>) -> Self {
        Self {
            cache_name: cache_name.into(),
            ..Self::default()
        }
    }

    /// Whether a URL matches the realtime-service denylist.
    pub fn is_bypassed(&self, url: &str) -> bool {
        self.bypass_patterns.iter().any(|p| url.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest_includes_offline_page() {
        let config = AgentConfig::default();
        assert!(config
            .precache_manifest
            .contains(&config.offline_url));
    }

    #[test]
    fn test_bypass_substring_match() {
        let config = AgentConfig::default();
        assert!(config.is_bypassed("https://firestore.googleapis.com/v1/projects/x"));
        assert!(config.is_bypassed("https://identitytoolkit.googleapis.com/token"));
        assert!(!config.is_bypassed("/app.js"));
        // CDN-hosted firebase SDK matches too; the install-time precache
        // stores it directly without going through the interceptor.
        assert!(config.is_bypassed(
            "https://www.gstatic.com/firebasejs/10.7.0/firebase-app-compat.js"
        ));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: AgentConfig =
            serde_json::from_str(r#"{ "cache_name": "app-v2.0.0" }"#).unwrap();
        assert_eq!(config.cache_name, "app-v2.0.0");
        assert_eq!(config.offline_url, "/offline.html");
        assert!(!config.bypass_patterns.is_empty());
    }

    #[test]
    fn test_with_cache_name() {
        let config = AgentConfig::with_cache_name("app-v0.1.0");
        assert_eq!(config.cache_name, "app-v0.1.0");
        assert_eq!(config.offline_url, AgentConfig::default().offline_url);
    }
}
