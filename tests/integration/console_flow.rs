//! Dispatch, list sync and dialog saves running against a live server

use std::sync::Arc;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use portside::api::NodeApi;
use portside::console::{
    forms, port_links, ActionDispatcher, ActionRequest, ConsoleOrigin, ContainerAction,
    ContainerListSync, DispatchContext, FollowUp, FormOutcome, NodeHeadSync, Outcome, PendingSet,
};
use portside::core::ContainerState;

use crate::common::{container, Console, FakeConsole};

struct Harness {
    server: FakeConsole,
    containers: ContainerListSync,
    heads: NodeHeadSync,
    dispatcher: ActionDispatcher,
}

async fn harness(containers: Vec<serde_json::Value>) -> Harness {
    let server = FakeConsole::start(Console {
        containers,
        ..Console::default()
    })
    .await;
    let api: Arc<dyn NodeApi> = Arc::new(server.client());
    let sync = ContainerListSync::new(Arc::clone(&api));
    let heads = NodeHeadSync::new(Arc::clone(&api));
    let dispatcher = ActionDispatcher::new(api, sync.clone(), PendingSet::new());

    sync.refresh("1").await.unwrap();
    heads.refresh("1").await.unwrap();

    Harness {
        server,
        containers: sync,
        heads,
        dispatcher,
    }
}

fn state_of(sync: &ContainerListSync, id: &str) -> Option<ContainerState> {
    sync.current("1")
        .and_then(|list| list.find(id).map(|container| container.state.clone()))
}

#[tokio::test]
async fn test_stop_shows_exited_after_resync() {
    let h = harness(vec![container("abc123", "web", "running")]).await;
    let updates = h.containers.subscribe("1");

    let outcome = h
        .dispatcher
        .dispatch("1", "abc123", ContainerAction::Stop, DispatchContext::List)
        .await;

    assert!(outcome.is_success(), "{:?}", outcome);
    assert_eq!(outcome.message(), "Container stopped.");
    assert_eq!(outcome.follow_up(), Some(FollowUp::Resync));
    assert_eq!(state_of(&h.containers, "abc123"), Some(ContainerState::Exited));
    assert!(updates.has_changed().unwrap());
    assert_eq!(h.server.lock().list_requests, 2);
}

#[tokio::test]
async fn test_failed_start_leaves_list_untouched() {
    let h = harness(vec![container("abc123", "web", "exited")]).await;
    h.server.reject_next(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"errors":{"body":"port is already allocated"}}"#,
    );

    let outcome = h
        .dispatcher
        .dispatch("1", "abc123", ContainerAction::Start, DispatchContext::List)
        .await;

    match outcome {
        Outcome::Failure { message, request } => {
            assert_eq!(message, "port is already allocated");
            assert_eq!(request.action, ContainerAction::Start);
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(state_of(&h.containers, "abc123"), Some(ContainerState::Exited));
    assert_eq!(h.server.lock().list_requests, 1);
}

#[tokio::test]
async fn test_delete_from_detail_leaves_detail() {
    let h = harness(vec![
        container("abc123", "web", "exited"),
        container("def456", "db", "running"),
    ])
    .await;

    let outcome = h
        .dispatcher
        .dispatch("1", "abc123", ContainerAction::Delete, DispatchContext::Detail)
        .await;

    assert_eq!(outcome.follow_up(), Some(FollowUp::LeaveDetail));
    let list = h.containers.current("1").unwrap();
    assert_eq!(list.items.len(), 1);
    assert!(list.find("abc123").is_none());
}

#[tokio::test]
async fn test_container_is_busy_until_dispatch_completes() {
    let h = harness(vec![container("abc123", "web", "running")]).await;
    let request = ActionRequest::new("1", "abc123", ContainerAction::Restart, DispatchContext::List);

    let first = h.dispatcher.try_begin(request.clone()).unwrap();
    assert!(h.dispatcher.try_begin(request.clone()).is_none());
    assert!(h.dispatcher.pending().contains(&request.pending_key()));

    let outcome = first.run().await;
    assert!(outcome.is_success(), "{:?}", outcome);
    assert!(h.dispatcher.pending().is_empty());
    assert!(h.dispatcher.try_begin(request).is_some());
}

#[tokio::test]
async fn test_base_url_save_moves_wildcard_ports() {
    let h = harness(vec![container("abc123", "web", "running")]).await;
    let origin = ConsoleOrigin::new("http", "console.local");
    let list = h.containers.current("1").unwrap();
    let ports = &list.find("abc123").unwrap().ports;

    let before = port_links(ports, h.heads.current("1").as_deref(), &origin);
    assert_eq!(before[0].url.as_deref(), Some("http://console.local:8080"));
    assert_eq!(before[0].text, "0.0.0.0:8080->80/tcp");

    let outcome = forms::save_container_base_url(&h.heads, "1", "https://mybox.local").await;
    assert_eq!(
        outcome,
        FormOutcome::Saved {
            message: "Container Base URL has been saved.".to_string()
        }
    );

    let after = port_links(ports, h.heads.current("1").as_deref(), &origin);
    assert_eq!(after[0].url.as_deref(), Some("https://mybox.local:8080"));
}

#[tokio::test]
async fn test_clearing_base_url_falls_back_to_console_host() {
    let h = harness(vec![container("abc123", "web", "running")]).await;
    h.server.lock().base_url = "https://mybox.local".to_string();
    h.heads.refresh("1").await.unwrap();

    let outcome = forms::save_container_base_url(&h.heads, "1", "").await;
    assert!(outcome.is_saved(), "{:?}", outcome);

    let head = h.heads.current("1").unwrap();
    assert_eq!(head.base_url_override(), None);
    let list = h.containers.current("1").unwrap();
    let origin = ConsoleOrigin::new("http", "console.local");
    let links = port_links(&list.items[0].ports, Some(&*head), &origin);
    assert_eq!(links[0].url.as_deref(), Some("http://console.local:8080"));
}

#[tokio::test]
async fn test_failed_base_url_save_keeps_head() {
    let h = harness(vec![]).await;
    h.server.reject_next(StatusCode::BAD_REQUEST, r#"{"errors":{"body":"nope"}}"#);

    let outcome = forms::save_container_base_url(&h.heads, "1", "https://mybox.local").await;

    assert_eq!(
        outcome,
        FormOutcome::Failed {
            message: "There was a problem saving the URL. Try again!".to_string()
        }
    );
    assert_eq!(h.heads.current("1").unwrap().base_url_override(), None);
}
