//! Request and response shapes of the console server endpoints

use std::time::Duration;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use portside::api::compose::ComposeProjectUpdate;
use portside::api::settings::SERVER_URL_SETTING;
use portside::api::ApiClient;
use portside::console::{forms, ContainerAction, FormOutcome, PendingKey, PendingSet};
use portside::core::{ApiError, ContainerState, GENERIC_FAILURE_MESSAGE};

use crate::common::{container, image, Console, FakeConsole, Recorded};

async fn console_with_web(state: &str) -> FakeConsole {
    FakeConsole::start(Console {
        containers: vec![container("abc123", "web", state)],
        ..Console::default()
    })
    .await
}

#[tokio::test]
async fn test_lifecycle_commands_post_the_container_id() {
    let server = console_with_web("running").await;
    let client = server.client();

    client.stop_container("1", "abc123").await.unwrap();
    client.start_container("1", "abc123").await.unwrap();
    client.restart_container("1", "abc123").await.unwrap();

    assert_eq!(
        server.mutations(),
        vec![
            Recorded::new("POST", "/nodes/1/containers/stop", json!({ "id": "abc123" })),
            Recorded::new("POST", "/nodes/1/containers/start", json!({ "id": "abc123" })),
            Recorded::new("POST", "/nodes/1/containers/restart", json!({ "id": "abc123" })),
        ]
    );
}

#[tokio::test]
async fn test_delete_uses_container_path() {
    let server = console_with_web("exited").await;

    server
        .client()
        .run_container_action("1", "abc123", ContainerAction::Delete)
        .await
        .unwrap();

    assert_eq!(
        server.mutations(),
        vec![Recorded::new(
            "DELETE",
            "/nodes/1/containers/abc123",
            serde_json::Value::Null
        )]
    );
    assert!(server.container_state("abc123").is_none());
}

#[tokio::test]
async fn test_list_containers_decodes_rows() {
    let server = console_with_web("running").await;

    let list = server.client().list_containers("1").await.unwrap();

    assert_eq!(list.items.len(), 1);
    let web = &list.items[0];
    assert_eq!(web.name, "web");
    assert_eq!(web.state, ContainerState::Running);
    assert_eq!(web.ports[0].public_port, Some(8080));
    assert_eq!(web.ports[0].ip.as_deref(), Some("0.0.0.0"));
}

#[tokio::test]
async fn test_null_items_is_an_empty_list() {
    let server = FakeConsole::start(Console {
        containers_body: Some(r#"{"items":null}"#.to_string()),
        ..Console::default()
    })
    .await;

    let list = server.client().list_containers("1").await.unwrap();
    assert!(list.is_empty());
}

#[tokio::test]
async fn test_undecodable_list_is_malformed() {
    let server = FakeConsole::start(Console {
        containers_body: Some(r#"{"items":[{"id":7}]}"#.to_string()),
        ..Console::default()
    })
    .await;

    let err = server.client().list_containers("1").await.unwrap_err();
    assert!(matches!(err, ApiError::MalformedBody(_)), "{:?}", err);
}

#[tokio::test]
async fn test_structured_rejection_keeps_server_message() {
    let server = console_with_web("running").await;
    server.reject_next(
        StatusCode::CONFLICT,
        r#"{"errors":{"body":"Container is already running"}}"#,
    );

    let err = server.client().start_container("1", "abc123").await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Rejected {
            status: 409,
            message: Some("Container is already running".to_string()),
        }
    );
    assert_eq!(err.user_message(), "Container is already running");
}

#[tokio::test]
async fn test_unstructured_rejection_uses_generic_message() {
    let server = console_with_web("running").await;
    server.reject_next(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>");

    let err = server.client().stop_container("1", "abc123").await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Rejected {
            status: 502,
            message: None,
        }
    );
    assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    assert_eq!(server.container_state("abc123").as_deref(), Some("running"));
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&format!("http://{}/api/v1", addr), Duration::from_secs(2)).unwrap();
    let err = client.list_nodes().await.unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)), "{:?}", err);
    assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
}

#[tokio::test]
async fn test_base_url_patch_and_head() {
    let server = console_with_web("running").await;
    let client = server.client();

    let head = client.get_node_head("1").await.unwrap();
    assert_eq!(head.name, "box");
    assert_eq!(head.base_url_override(), None);

    client.set_container_base_url("1", "https://mybox.local").await.unwrap();

    assert_eq!(
        server.mutations(),
        vec![Recorded::new(
            "PATCH",
            "/nodes/1",
            json!({ "containerBaseUrl": "https://mybox.local" })
        )]
    );
    let head = client.get_node_head("1").await.unwrap();
    assert_eq!(head.base_url_override(), Some("https://mybox.local"));

    let nodes = client.list_nodes().await.unwrap();
    assert_eq!(nodes.items[0].container_base_url.as_deref(), Some("https://mybox.local"));
}

#[tokio::test]
async fn test_unknown_node_head_is_rejected() {
    let server = console_with_web("running").await;

    let err = server.client().get_node_head("9").await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected { status: 404, .. }), "{:?}", err);
    assert_eq!(err.user_message(), "Node not found");
}

#[tokio::test]
async fn test_server_url_setting() {
    let server = FakeConsole::start(Console::default()).await;
    let client = server.client();

    let setting = client.get_setting(SERVER_URL_SETTING).await.unwrap();
    assert_eq!(setting.id, "SERVER_URL");
    assert!(setting.value.is_empty());

    let outcome = forms::save_server_url(&client, "https://console.example.com").await;
    assert_eq!(
        outcome,
        FormOutcome::Saved {
            message: "Server URL has been saved.".to_string()
        }
    );
    assert_eq!(
        server.mutations(),
        vec![Recorded::new(
            "PUT",
            "/settings/SERVER_URL",
            json!({ "value": "https://console.example.com" })
        )]
    );

    let setting = client.get_setting(SERVER_URL_SETTING).await.unwrap();
    assert_eq!(setting.value, "https://console.example.com");
}

#[tokio::test]
async fn test_server_url_save_failure() {
    let server = FakeConsole::start(Console::default()).await;
    server.reject_next(StatusCode::INTERNAL_SERVER_ERROR, "");

    let outcome = forms::save_server_url(&server.client(), "https://console.example.com").await;
    assert_eq!(
        outcome,
        FormOutcome::Failed {
            message: "There was a problem saving the URL. Try again!".to_string()
        }
    );
}

#[tokio::test]
async fn test_compose_save_renames_project() {
    let server = FakeConsole::start(Console {
        projects: vec![("wiki".to_string(), "services: {}\n".to_string())],
        ..Console::default()
    })
    .await;
    let client = server.client();

    let project = client.get_compose_project("wiki").await.unwrap();
    assert_eq!(project.definition, "services: {}\n");

    let definition = "services:\n  web:\n    image: nginx\n".to_string();
    let outcome =
        forms::save_compose_project(&client, &PendingSet::new(), "wiki", "docs", definition.clone())
            .await;
    assert!(outcome.is_saved(), "{:?}", outcome);
    assert_eq!(outcome.message(), "Definition has been saved.");

    assert_eq!(
        server.mutations(),
        vec![Recorded::new(
            "PUT",
            "/composelibrary/wiki",
            json!({ "newProjectName": "docs", "definition": definition })
        )]
    );

    let names: Vec<String> = client
        .list_compose_projects()
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|item| item.project_name)
        .collect();
    assert_eq!(names, vec!["docs".to_string()]);
}

#[tokio::test]
async fn test_compose_update_body_is_sent_as_is() {
    let server = FakeConsole::start(Console::default()).await;
    let update = ComposeProjectUpdate {
        new_project_name: "wiki".to_string(),
        definition: String::new(),
    };

    server.client().update_compose_project("wiki", &update).await.unwrap();

    assert_eq!(
        server.mutations()[0].body,
        json!({ "newProjectName": "wiki", "definition": "" })
    );
}

#[tokio::test]
async fn test_compose_invalid_name_is_not_sent() {
    let server = FakeConsole::start(Console::default()).await;

    let outcome = forms::save_compose_project(
        &server.client(),
        &PendingSet::new(),
        "wiki",
        "bad name!",
        String::new(),
    )
    .await;

    assert!(matches!(outcome, FormOutcome::Invalid { .. }), "{:?}", outcome);
    assert!(server.mutations().is_empty());
}

#[tokio::test]
async fn test_compose_delete_failure_shows_server_message() {
    let server = FakeConsole::start(Console {
        projects: vec![("wiki".to_string(), String::new())],
        ..Console::default()
    })
    .await;
    server.reject_next(
        StatusCode::CONFLICT,
        r#"{"errors":{"body":"Project is deployed on 2 nodes"}}"#,
    );

    let outcome =
        forms::delete_compose_project(&server.client(), &PendingSet::new(), "wiki").await;

    assert_eq!(
        outcome,
        FormOutcome::Failed {
            message: "Project is deployed on 2 nodes".to_string()
        }
    );
    assert_eq!(server.lock().projects.len(), 1);
}

#[tokio::test]
async fn test_environment_add_checks_uniqueness() {
    let server = FakeConsole::start(Console {
        environments: vec!["staging".to_string()],
        ..Console::default()
    })
    .await;
    let client = server.client();
    let pending = PendingSet::new();

    let outcome = forms::add_environment(&client, &pending, "staging").await;
    assert_eq!(
        outcome,
        FormOutcome::Invalid {
            message: "Another environment with this name already exists".to_string()
        }
    );
    assert!(server.mutations().is_empty());

    let outcome = forms::add_environment(&client, &pending, "production").await;
    assert_eq!(outcome.message(), "New environment has been added.");
    assert_eq!(
        server.mutations(),
        vec![Recorded::new("POST", "/environments", json!({ "name": "production" }))]
    );
}

#[tokio::test]
async fn test_compose_save_while_pending_sends_nothing() {
    let server = FakeConsole::start(Console {
        projects: vec![("wiki".to_string(), String::new())],
        ..Console::default()
    })
    .await;
    let client = server.client();
    let pending = PendingSet::new();
    let token = pending
        .try_acquire(PendingKey::ComposeProject("wiki".to_string()))
        .unwrap();

    let save = forms::save_compose_project(&client, &pending, "wiki", "wiki", String::new()).await;
    let delete = forms::delete_compose_project(&client, &pending, "wiki").await;

    assert!(matches!(save, FormOutcome::Busy { .. }), "{:?}", save);
    assert!(matches!(delete, FormOutcome::Busy { .. }), "{:?}", delete);
    assert!(server.mutations().is_empty());

    drop(token);
    let outcome = forms::delete_compose_project(&client, &pending, "wiki").await;
    assert_eq!(outcome.message(), "Compose project deleted.");
    assert!(pending.is_empty());
}

#[tokio::test]
async fn test_environment_add_while_pending_sends_nothing() {
    let server = FakeConsole::start(Console::default()).await;
    let pending = PendingSet::new();
    let _token = pending.try_acquire(PendingKey::NewEnvironment).unwrap();

    let outcome = forms::add_environment(&server.client(), &pending, "production").await;

    assert_eq!(
        outcome,
        FormOutcome::Busy {
            message: "Already saving. Wait for it to finish.".to_string()
        }
    );
    assert!(server.mutations().is_empty());
    assert!(server.lock().environments.is_empty());
}

fn console_with_images() -> Console {
    Console {
        images: vec![
            image("sha256:1111111111111111", "redis:7", 1024),
            image("sha256:2222222222222222", "<none>:<none>", 4096),
            image("sha256:3333333333333333", "alpine:3.19", 2048),
        ],
        ..Console::default()
    }
}

#[tokio::test]
async fn test_list_images_splits_tags_and_sorts() {
    let server = FakeConsole::start(console_with_images()).await;
    let client = server.client();

    let tagged = client.list_images("1", false).await.unwrap();
    let rows: Vec<(&str, &str)> = tagged
        .items
        .iter()
        .map(|image| (image.name.as_str(), image.tag.as_str()))
        .collect();
    assert_eq!(rows, vec![("alpine", "3.19"), ("redis", "7")]);

    let all = client.list_images("1", true).await.unwrap();
    assert_eq!(all.items.len(), 3);
    assert_eq!(all.items[0].name, "<none>");
    assert_eq!(all.items[0].short_id(), "222222222222");
}

#[tokio::test]
async fn test_remove_image_passes_force() {
    let server = FakeConsole::start(console_with_images()).await;
    let client = server.client();

    client
        .remove_image("1", "sha256:1111111111111111", true)
        .await
        .unwrap();
    let err = client.remove_image("1", "sha256:9999", false).await.unwrap_err();

    assert_eq!(err.user_message(), "Image not found");
    assert_eq!(
        server.mutations(),
        vec![
            Recorded::new(
                "DELETE",
                "/nodes/1/images/sha256:1111111111111111?force=true",
                serde_json::Value::Null
            ),
            Recorded::new(
                "DELETE",
                "/nodes/1/images/sha256:9999?force=false",
                serde_json::Value::Null
            ),
        ]
    );
    assert_eq!(server.lock().images.len(), 2);
}

#[tokio::test]
async fn test_prune_images_reports_reclaimed_space() {
    let server = FakeConsole::start(console_with_images()).await;
    let client = server.client();

    let report = client.prune_images("1", false).await.unwrap();
    assert_eq!(report.images_deleted.len(), 1);
    assert_eq!(report.images_deleted[0].deleted, "sha256:2222222222222222");
    assert_eq!(report.space_reclaimed, 4096);
    assert_eq!(server.lock().images.len(), 2);

    let report = client.prune_images("1", true).await.unwrap();
    assert_eq!(report.space_reclaimed, 3072);
    assert!(server.lock().images.is_empty());

    assert_eq!(
        server.mutations(),
        vec![
            Recorded::new("POST", "/nodes/1/images/prune", json!({ "all": false })),
            Recorded::new("POST", "/nodes/1/images/prune", json!({ "all": true })),
        ]
    );
}
