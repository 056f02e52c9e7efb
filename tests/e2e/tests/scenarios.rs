//! End-to-end scenarios: install, activation reaping, the full cache
//! strategy, skip-waiting, and the auxiliary handlers, driven through
//! `Agent::handle_event` exactly as a hosting runtime would.

use std::sync::Arc;

use offline_agent::{
    Agent, AgentConfig, AgentEvent, AgentState, EventOutcome, FetchResult, FetchSource, Request,
    ResponseType, SyncOutcome,
};
use offline_agent_e2e::{MockNetwork, Scripted};
use serde_json::json;

fn config() -> AgentConfig {
    AgentConfig {
        precache_manifest: vec!["/".to_string(), "/offline.html".to_string()],
        ..AgentConfig::with_cache_name("app-v1.0.0")
    }
}

fn agent_with(network: Arc<MockNetwork>) -> Agent {
    Agent::new(config(), network)
}

/// Scenario A: a two-entry manifest installs completely.
#[tokio::test]
async fn install_precaches_whole_manifest() {
    let network = Arc::new(MockNetwork::new());
    network.serve("/", b"<html>home</html>");
    network.serve("/offline.html", b"<html>offline</html>");
    let mut agent = agent_with(network.clone());

    let outcome = agent.handle_event(AgentEvent::Install).await;

    let EventOutcome::Installed(report) = outcome else {
        panic!("expected Installed outcome");
    };
    assert!(report.complete());
    assert_eq!(agent.cache().entry_count("app-v1.0.0").await, 2);
}

/// Scenario B: miss → network → delivered and cached; the identical
/// request afterwards is a hit with no network call.
#[tokio::test]
async fn miss_then_hit_round_trip() {
    let network = Arc::new(MockNetwork::new());
    network.serve("/app.js", b"console.log('v1')");
    let mut agent = agent_with(network.clone());

    let first = agent
        .handle_event(AgentEvent::Fetch(Request::get("/app.js")))
        .await;
    let EventOutcome::Fetch(FetchResult::Response { response, source }) = first else {
        panic!("expected a response");
    };
    assert_eq!(source, FetchSource::Network);
    assert_eq!(response.body.as_deref(), Some(b"console.log('v1')".as_slice()));

    agent.flush_writes().await;

    let second = agent
        .handle_event(AgentEvent::Fetch(Request::get("/app.js")))
        .await;
    let EventOutcome::Fetch(FetchResult::Response { response, source }) = second else {
        panic!("expected a response");
    };
    assert_eq!(source, FetchSource::Cache);
    assert_eq!(response.body.as_deref(), Some(b"console.log('v1')".as_slice()));
    assert_eq!(network.calls_for("/app.js"), 1);
}

/// Scenario C: miss with the network down serves the offline document.
#[tokio::test]
async fn network_failure_serves_offline_page() {
    let network = Arc::new(MockNetwork::new());
    network.serve("/offline.html", b"<html>sin conexion</html>");
    let mut agent = agent_with(network.clone());
    agent.handle_event(AgentEvent::Install).await;

    network.set_offline(true);
    let outcome = agent
        .handle_event(AgentEvent::Fetch(Request::get("/app.js")))
        .await;

    let EventOutcome::Fetch(FetchResult::Response { response, source }) = outcome else {
        panic!("expected a response");
    };
    assert_eq!(source, FetchSource::OfflineFallback);
    assert_eq!(
        response.body.as_deref(),
        Some(b"<html>sin conexion</html>".as_slice())
    );
}

/// Scenario D: realtime-service URLs are never intercepted.
#[tokio::test]
async fn realtime_urls_pass_through() {
    let network = Arc::new(MockNetwork::new());
    let mut agent = agent_with(network.clone());
    agent.handle_event(AgentEvent::Install).await;
    let baseline = network.total_calls();

    let url = "https://firestore.googleapis.com/v1/projects/visa/databases";
    let outcome = agent
        .handle_event(AgentEvent::Fetch(Request::get(url)))
        .await;

    assert!(matches!(
        outcome,
        EventOutcome::Fetch(FetchResult::Passthrough(_))
    ));
    // neither the network seam nor the store were touched
    assert_eq!(network.total_calls(), baseline);
    agent.flush_writes().await;
    assert!(agent
        .cache()
        .match_in("app-v1.0.0", &Request::get(url))
        .await
        .is_none());
}

/// Scenario E: activation deletes exactly the stale generations.
#[tokio::test]
async fn activation_reaps_old_generations() {
    let network = Arc::new(MockNetwork::new());
    let mut agent = agent_with(network);
    agent.cache().open("app-v0.9.0").await;

    agent.handle_event(AgentEvent::Install).await;

    assert_eq!(agent.state(), AgentState::Activated);
    assert_eq!(agent.cache().keys().await, vec!["app-v1.0.0".to_string()]);
}

/// Scenario F: SKIP_WAITING while waiting activates without page closes.
#[tokio::test]
async fn skip_waiting_message_activates_waiting_agent() {
    let network = Arc::new(MockNetwork::new());
    // one failing manifest entry keeps the install incomplete, so the
    // agent stays in the waiting state instead of auto-activating
    network.script("/offline.html", Scripted::Unreachable);
    let mut agent = agent_with(network.clone());
    agent.clients_mut().add("/cliente/");

    agent.handle_event(AgentEvent::Install).await;
    assert_eq!(agent.state(), AgentState::Installed);

    let outcome = agent
        .handle_event(AgentEvent::Message(json!({ "type": "SKIP_WAITING" })))
        .await;

    assert!(matches!(outcome, EventOutcome::MessageAccepted));
    assert_eq!(agent.state(), AgentState::Activated);
    assert!(agent.clients().all().iter().all(|c| c.controlled));
}

/// Failed precache rolls the generation back and the offline path
/// degrades to the synthesized response.
#[tokio::test]
async fn incomplete_install_synthesizes_offline_response() {
    let network = Arc::new(MockNetwork::new());
    network.script("/offline.html", Scripted::Unreachable);
    let mut agent = agent_with(network.clone());

    let EventOutcome::Installed(report) = agent.handle_event(AgentEvent::Install).await else {
        panic!("expected Installed outcome");
    };
    assert!(!report.complete());
    assert!(report.rolled_back);
    assert!(!agent.cache().has("app-v1.0.0").await);

    network.set_offline(true);
    let outcome = agent
        .handle_event(AgentEvent::Fetch(Request::get("/index.html")))
        .await;
    let EventOutcome::Fetch(FetchResult::Response { response, source }) = outcome else {
        panic!("expected a response");
    };
    assert_eq!(source, FetchSource::OfflineFallback);
    assert_eq!(response.status, 503);
}

/// Cross-origin (non-Basic) responses are returned but never cached.
#[tokio::test]
async fn opaque_responses_are_never_cached() {
    let network = Arc::new(MockNetwork::new());
    let url = "https://cdn.tailwindcss.com";
    network.script(
        url,
        Scripted::Respond {
            status: 200,
            response_type: ResponseType::Opaque,
            body: b"/* css */".to_vec(),
        },
    );
    let mut agent = agent_with(network.clone());

    agent.handle_event(AgentEvent::Fetch(Request::get(url))).await;
    agent.flush_writes().await;
    agent.handle_event(AgentEvent::Fetch(Request::get(url))).await;

    assert_eq!(network.calls_for(url), 2);
    assert!(agent
        .cache()
        .match_in("app-v1.0.0", &Request::get(url))
        .await
        .is_none());
}

/// Push → notification → explore click opens the app root.
#[tokio::test]
async fn push_and_notification_click_flow() {
    let network = Arc::new(MockNetwork::new());
    let mut agent = agent_with(network);

    let EventOutcome::NotificationShown(id) = agent
        .handle_event(AgentEvent::Push(Some(b"Nueva cita disponible".to_vec())))
        .await
    else {
        panic!("expected NotificationShown");
    };
    assert_eq!(
        agent.notifications().get(id).unwrap().body,
        "Nueva cita disponible"
    );

    agent
        .handle_event(AgentEvent::NotificationClick {
            id,
            action: Some("explore".to_string()),
        })
        .await;

    assert!(agent.notifications().get(id).unwrap().closed);
    assert_eq!(agent.clients().all()[0].url, "/");
}

/// Only the video-upload sync tag is recognized.
#[tokio::test]
async fn sync_tag_filter() {
    let network = Arc::new(MockNetwork::new());
    let mut agent = agent_with(network);

    let recognized = agent
        .handle_event(AgentEvent::Sync {
            tag: "video-upload".to_string(),
        })
        .await;
    assert!(matches!(
        recognized,
        EventOutcome::Sync(SyncOutcome::Completed(0))
    ));

    let ignored = agent
        .handle_event(AgentEvent::Sync {
            tag: "photo-upload".to_string(),
        })
        .await;
    assert!(matches!(ignored, EventOutcome::Sync(SyncOutcome::IgnoredTag)));
}
