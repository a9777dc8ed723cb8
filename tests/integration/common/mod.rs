//! In-process console server for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use portside::api::ApiClient;

/// A non-GET request the server received
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub body: Value,
}

impl Recorded {
    pub fn new(method: &'static str, path: &str, body: Value) -> Self {
        Self {
            method,
            path: path.to_string(),
            body,
        }
    }
}

/// Server-side data the fake console answers from
#[derive(Debug, Default)]
pub struct Console {
    pub containers: Vec<Value>,
    pub base_url: String,
    pub settings: HashMap<String, String>,
    pub projects: Vec<(String, String)>,
    pub environments: Vec<String>,
    /// Image summaries as the node reports them
    pub images: Vec<Value>,
    /// Served instead of the container list when set
    pub containers_body: Option<String>,
    /// Returned by the next mutating request instead of handling it
    pub reject_next: Option<(StatusCode, String)>,
    pub mutations: Vec<Recorded>,
    pub list_requests: usize,
}

pub type Shared = Arc<Mutex<Console>>;

pub struct FakeConsole {
    pub addr: SocketAddr,
    state: Shared,
}

impl FakeConsole {
    pub async fn start(console: Console) -> Self {
        let state = Arc::new(Mutex::new(console));
        let app = Router::new()
            .nest("/api/v1", routes())
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn api_root(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.api_root(), Duration::from_secs(5)).unwrap()
    }

    pub fn lock(&self) -> MutexGuard<'_, Console> {
        self.state.lock().unwrap()
    }

    pub fn mutations(&self) -> Vec<Recorded> {
        self.lock().mutations.clone()
    }

    pub fn reject_next(&self, status: StatusCode, body: &str) {
        self.lock().reject_next = Some((status, body.to_string()));
    }

    pub fn container_state(&self, id: &str) -> Option<String> {
        self.lock()
            .containers
            .iter()
            .find(|c| c["id"] == id)
            .and_then(|c| c["state"].as_str().map(str::to_string))
    }
}

pub fn container(id: &str, name: &str, state: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "state": state,
        "status": "",
        "ports": [
            { "ip": "0.0.0.0", "privatePort": 80, "publicPort": 8080, "type": "tcp" }
        ]
    })
}

pub fn image(id: &str, repo_tag: &str, size: i64) -> Value {
    json!({ "id": id, "repoTags": [repo_tag], "size": size, "created": 1_700_000_000 })
}

fn routes() -> Router<Shared> {
    Router::new()
        .route("/nodes", get(list_nodes))
        .route("/nodes/{node}", axum::routing::patch(patch_node))
        .route("/nodes/{node}/head", get(node_head))
        .route("/nodes/{node}/containers", get(list_containers))
        .route(
            "/nodes/{node}/containers/{target}",
            post(container_command).delete(remove_container),
        )
        .route("/nodes/{node}/images", get(list_images))
        .route(
            "/nodes/{node}/images/{target}",
            post(prune_images).delete(remove_image),
        )
        .route("/settings/{id}", get(get_setting).put(put_setting))
        .route("/composelibrary", get(list_projects))
        .route(
            "/composelibrary/{name}",
            get(get_project).put(put_project).delete(delete_project),
        )
        .route("/environments", post(create_environment))
        .route("/environments/uniquename", get(unique_name))
}

/// Record a mutation; returns the queued rejection, if any
fn record(state: &Shared, method: &'static str, path: String, body: Value) -> Option<Response> {
    let mut console = state.lock().unwrap();
    console.mutations.push(Recorded { method, path, body });
    console
        .reject_next
        .take()
        .map(|(status, body)| (status, body).into_response())
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "errors": { "body": format!("{} not found", what) } })),
    )
        .into_response()
}

async fn list_nodes(State(state): State<Shared>) -> Json<Value> {
    let console = state.lock().unwrap();
    Json(json!({
        "items": [
            { "id": 1, "name": "box", "online": true, "containerBaseUrl": console.base_url }
        ]
    }))
}

async fn node_head(State(state): State<Shared>, Path(node): Path<String>) -> Response {
    if node != "1" {
        return not_found("Node");
    }
    let console = state.lock().unwrap();
    Json(json!({ "id": 1, "name": "box", "containerBaseUrl": console.base_url })).into_response()
}

async fn patch_node(
    State(state): State<Shared>,
    Path(node): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejection) = record(&state, "PATCH", format!("/nodes/{}", node), body.clone()) {
        return rejection;
    }
    let mut console = state.lock().unwrap();
    console.base_url = body["containerBaseUrl"].as_str().unwrap_or_default().to_string();
    StatusCode::NO_CONTENT.into_response()
}

async fn list_containers(State(state): State<Shared>, Path(_node): Path<String>) -> Response {
    let mut console = state.lock().unwrap();
    console.list_requests += 1;
    if let Some(raw) = console.containers_body.clone() {
        return (
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            raw,
        )
            .into_response();
    }
    Json(json!({ "items": console.containers })).into_response()
}

async fn container_command(
    State(state): State<Shared>,
    Path((node, command)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let path = format!("/nodes/{}/containers/{}", node, command);
    if let Some(rejection) = record(&state, "POST", path, body.clone()) {
        return rejection;
    }

    let new_state = match command.as_str() {
        "start" | "restart" => "running",
        "stop" => "exited",
        _ => return not_found("Command"),
    };
    let id = body["id"].as_str().unwrap_or_default();
    let mut console = state.lock().unwrap();
    for container in console.containers.iter_mut() {
        if container["id"] == id {
            container["state"] = json!(new_state);
        }
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn remove_container(
    State(state): State<Shared>,
    Path((node, id)): Path<(String, String)>,
) -> Response {
    let path = format!("/nodes/{}/containers/{}", node, id);
    if let Some(rejection) = record(&state, "DELETE", path, Value::Null) {
        return rejection;
    }
    let mut console = state.lock().unwrap();
    console.containers.retain(|container| container["id"] != id.as_str());
    StatusCode::NO_CONTENT.into_response()
}

async fn list_images(
    State(state): State<Shared>,
    Path(_node): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let console = state.lock().unwrap();
    let all = query.get("all").map(String::as_str) == Some("true");
    let items: Vec<&Value> = console
        .images
        .iter()
        .filter(|image| all || image["repoTags"] != json!(["<none>:<none>"]))
        .collect();
    Json(json!({ "items": items }))
}

async fn remove_image(
    State(state): State<Shared>,
    Path((node, id)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let force = query.get("force").cloned().unwrap_or_default();
    let path = format!("/nodes/{}/images/{}?force={}", node, id, force);
    if let Some(rejection) = record(&state, "DELETE", path, Value::Null) {
        return rejection;
    }
    let mut console = state.lock().unwrap();
    let before = console.images.len();
    console.images.retain(|image| image["id"] != id.as_str());
    if console.images.len() == before {
        return not_found("Image");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn prune_images(
    State(state): State<Shared>,
    Path((node, target)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if target != "prune" {
        return not_found("Command");
    }
    let path = format!("/nodes/{}/images/prune", node);
    if let Some(rejection) = record(&state, "POST", path, body.clone()) {
        return rejection;
    }

    // Every image without a usable tag counts as dangling
    let all = body["all"].as_bool().unwrap_or_default();
    let mut console = state.lock().unwrap();
    let (pruned, kept): (Vec<Value>, Vec<Value>) = console
        .images
        .drain(..)
        .partition(|image| all || image["repoTags"] == json!(["<none>:<none>"]));
    console.images = kept;

    let deleted: Vec<Value> = pruned
        .iter()
        .map(|image| json!({ "deleted": image["id"] }))
        .collect();
    let reclaimed: i64 = pruned.iter().filter_map(|image| image["size"].as_i64()).sum();
    Json(json!({ "imagesDeleted": deleted, "spaceReclaimed": reclaimed })).into_response()
}

async fn get_setting(State(state): State<Shared>, Path(id): Path<String>) -> Json<Value> {
    let console = state.lock().unwrap();
    let value = console.settings.get(&id).cloned().unwrap_or_default();
    Json(json!({ "id": id, "value": value }))
}

async fn put_setting(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejection) = record(&state, "PUT", format!("/settings/{}", id), body.clone()) {
        return rejection;
    }
    let value = body["value"].as_str().unwrap_or_default().to_string();
    state.lock().unwrap().settings.insert(id, value);
    StatusCode::NO_CONTENT.into_response()
}

async fn list_projects(State(state): State<Shared>) -> Json<Value> {
    let console = state.lock().unwrap();
    let items: Vec<Value> = console
        .projects
        .iter()
        .map(|(name, _)| json!({ "projectName": name }))
        .collect();
    Json(json!({ "items": items }))
}

async fn get_project(State(state): State<Shared>, Path(name): Path<String>) -> Response {
    let console = state.lock().unwrap();
    match console.projects.iter().find(|(project, _)| *project == name) {
        Some((project, definition)) => {
            Json(json!({ "projectName": project, "definition": definition })).into_response()
        }
        None => not_found("Project"),
    }
}

async fn put_project(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let path = format!("/composelibrary/{}", name);
    if let Some(rejection) = record(&state, "PUT", path, body.clone()) {
        return rejection;
    }
    let new_name = body["newProjectName"].as_str().unwrap_or_default().to_string();
    let definition = body["definition"].as_str().unwrap_or_default().to_string();
    let mut console = state.lock().unwrap();
    console.projects.retain(|(project, _)| *project != name);
    console.projects.push((new_name, definition));
    StatusCode::NO_CONTENT.into_response()
}

async fn delete_project(State(state): State<Shared>, Path(name): Path<String>) -> Response {
    let path = format!("/composelibrary/{}", name);
    if let Some(rejection) = record(&state, "DELETE", path, Value::Null) {
        return rejection;
    }
    state
        .lock()
        .unwrap()
        .projects
        .retain(|(project, _)| *project != name);
    StatusCode::NO_CONTENT.into_response()
}

async fn unique_name(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let console = state.lock().unwrap();
    let name = query.get("value").cloned().unwrap_or_default();
    Json(json!({ "unique": !console.environments.contains(&name) }))
}

async fn create_environment(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if let Some(rejection) = record(&state, "POST", "/environments".to_string(), body.clone()) {
        return rejection;
    }
    let name = body["name"].as_str().unwrap_or_default().to_string();
    state.lock().unwrap().environments.push(name);
    (StatusCode::CREATED, Json(json!({ "name": body["name"] }))).into_response()
}
