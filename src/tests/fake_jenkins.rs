//! Round trips against an in-process Jenkins stand-in built with axum.
//!
//! The stand-in issues a crumb bound to a session cookie and rejects POSTs that
//! lack either, so these tests also cover crumb and cookie continuity.

use crate::api::BuildRequest;
use crate::client::Jenkins;
use crate::protocol::{JobConfig, NodeConfig};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::future::join_all;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

const CRUMB: &str = "fake-crumb";
const SESSION: &str = "JSESSIONID.fake=s1";

#[derive(Default)]
struct FakeState {
    jobs: BTreeMap<String, String>,
    views: BTreeMap<String, String>,
    nodes: BTreeMap<String, Value>,
    queue: Vec<u64>,
    next_queue_id: u64,
    crumb_probes: usize,
}

type Shared = Arc<Mutex<FakeState>>;

fn authorized(headers: &HeaderMap) -> bool {
    let crumb = headers.get("Jenkins-Crumb").and_then(|v| v.to_str().ok());
    let cookie = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());
    crumb == Some(CRUMB) && cookie.is_some_and(|c| c.contains(SESSION))
}

fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, "No valid crumb was included in the request").into_response()
}

async fn crumb_issuer(State(state): State<Shared>) -> Response {
    state.lock().crumb_probes += 1;
    (
        [(header::SET_COOKIE, format!("{}; Path=/; HttpOnly", SESSION))],
        Json(json!({ "crumb": CRUMB, "crumbRequestField": "Jenkins-Crumb" })),
    )
        .into_response()
}

async fn status(State(state): State<Shared>) -> Json<Value> {
    let state = state.lock();
    let jobs: Vec<Value> = state
        .jobs
        .keys()
        .map(|name| {
            json!({
                "_class": "hudson.model.FreeStyleProject",
                "name": name,
                "url": format!("http://fake/job/{}/", name),
            })
        })
        .collect();
    let views: Vec<Value> = std::iter::once("all".to_string())
        .chain(state.views.keys().cloned())
        .map(|name| json!({ "name": name }))
        .collect();

    Json(json!({ "mode": "NORMAL", "jobs": jobs, "views": views }))
}

async fn root() -> Response {
    ([("X-Jenkins", "2.414.3")], "").into_response()
}

async fn create_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    if !authorized(&headers) {
        return forbidden();
    }
    let Some(name) = query.get("name") else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let mut state = state.lock();
    if state.jobs.contains_key(name) {
        return (StatusCode::BAD_REQUEST, format!("A job already exists with the name {}", name))
            .into_response();
    }

    let config = match (query.get("mode").map(String::as_str), query.get("from")) {
        (Some("copy"), Some(from)) => match state.jobs.get(from) {
            Some(config) => config.clone(),
            None => return StatusCode::NOT_FOUND.into_response(),
        },
        _ => body,
    };
    state.jobs.insert(name.clone(), config);
    StatusCode::OK.into_response()
}

async fn job_info(State(state): State<Shared>, Path(name): Path<String>) -> Response {
    match state.lock().jobs.contains_key(&name) {
        true => Json(json!({ "name": name, "buildable": true })).into_response(),
        false => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn job_config(State(state): State<Shared>, Path(name): Path<String>) -> Response {
    match state.lock().jobs.get(&name) {
        Some(config) => config.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn job_delete(State(state): State<Shared>, headers: HeaderMap, Path(name): Path<String>) -> Response {
    if !authorized(&headers) {
        return forbidden();
    }
    match state.lock().jobs.remove(&name) {
        Some(_) => StatusCode::OK.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn job_build(State(state): State<Shared>, headers: HeaderMap, Path(name): Path<String>) -> Response {
    if !authorized(&headers) {
        return forbidden();
    }
    let mut state = state.lock();
    if !state.jobs.contains_key(&name) {
        return StatusCode::NOT_FOUND.into_response();
    }
    state.next_queue_id += 1;
    let id = state.next_queue_id;
    state.queue.push(id);

    (
        StatusCode::CREATED,
        [(header::LOCATION, format!("http://fake/queue/item/{}/", id))],
    )
        .into_response()
}

async fn queue(State(state): State<Shared>) -> Json<Value> {
    let items: Vec<Value> = state
        .lock()
        .queue
        .iter()
        .map(|id| json!({ "id": id, "buildable": true, "why": "Waiting for next available executor" }))
        .collect();
    Json(json!({ "items": items }))
}

async fn create_view(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    if !authorized(&headers) {
        return forbidden();
    }
    match query.get("name") {
        Some(name) => {
            state.lock().views.insert(name.clone(), body);
            StatusCode::OK.into_response()
        }
        None => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn view_delete(State(state): State<Shared>, headers: HeaderMap, Path(name): Path<String>) -> Response {
    if !authorized(&headers) {
        return forbidden();
    }
    match state.lock().views.remove(&name) {
        Some(_) => StatusCode::OK.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn computers(State(state): State<Shared>) -> Json<Value> {
    let mut computers = vec![json!({ "displayName": "Built-In Node", "offline": false })];
    computers.extend(state.lock().nodes.values().cloned());
    Json(json!({ "computer": computers }))
}

async fn create_node(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return forbidden();
    }
    let (Some(name), Some(form)) = (query.get("name"), query.get("json")) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let Ok(form) = serde_json::from_str::<Value>(form) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    if form["name"] != json!(name) || form["type"] != json!(query.get("type")) {
        return StatusCode::BAD_REQUEST.into_response();
    }

    state
        .lock()
        .nodes
        .insert(name.clone(), json!({ "displayName": name, "offline": true }));
    StatusCode::OK.into_response()
}

async fn node_info(State(state): State<Shared>, Path(name): Path<String>) -> Response {
    match state.lock().nodes.get(&name) {
        Some(node) => Json(node.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn node_delete(State(state): State<Shared>, headers: HeaderMap, Path(name): Path<String>) -> Response {
    if !authorized(&headers) {
        return forbidden();
    }
    match state.lock().nodes.remove(&name) {
        Some(_) => StatusCode::OK.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn start_fake() -> (Jenkins, Shared) {
    let state = Shared::default();
    let app = Router::new()
        .route("/", get(root))
        .route("/api/json", get(status))
        .route("/crumbIssuer/api/json", get(crumb_issuer))
        .route("/createItem", post(create_item))
        .route("/job/{name}/api/json", get(job_info))
        .route("/job/{name}/config.xml", get(job_config))
        .route("/job/{name}/doDelete", post(job_delete))
        .route("/job/{name}/build", post(job_build))
        .route("/queue/api/json", get(queue))
        .route("/createView", post(create_view))
        .route("/view/{name}/doDelete", post(view_delete))
        .route("/computer/api/json", get(computers))
        .route("/computer/doCreateItem", post(create_node))
        .route("/computer/{name}/api/json", get(node_info))
        .route("/computer/{name}/doDelete", post(node_delete))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let jenkins = Jenkins::builder(format!("http://{}", addr))
        .credentials("admin", "admin")
        .build()
        .unwrap();
    (jenkins, state)
}

#[tokio::test]
async fn test_job_round_trip() {
    let (jenkins, _state) = start_fake().await;
    let jobs = jenkins.jobs();
    let config = jobs.construct_config(&JobConfig::new().with_command("echo hello"));

    jobs.create("app", &config).await.unwrap();
    let listed = jobs.get_all().await.unwrap();
    assert_eq!(listed.keys().filter(|n| *n == "app").count(), 1);
    assert!(jobs.is_exists("app").await.unwrap());
    assert_eq!(jobs.get_config("app").await.unwrap(), config);

    jobs.delete("app").await.unwrap();
    assert!(!jobs.get_all().await.unwrap().contains_key("app"));
    assert!(!jobs.is_exists("app").await.unwrap());
}

#[tokio::test]
async fn test_duplicate_job_rejected() {
    let (jenkins, _state) = start_fake().await;
    let config = JobConfig::new().to_xml();

    jenkins.jobs().create("app", &config).await.unwrap();
    let err = jenkins.jobs().create("app", &config).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("already exists"));
}

#[tokio::test]
async fn test_copy_job() {
    let (jenkins, _state) = start_fake().await;
    let config = JobConfig::new().with_description("original").to_xml();

    jenkins.jobs().create("app", &config).await.unwrap();
    jenkins.jobs().copy("app", "app-copy").await.unwrap();
    assert_eq!(jenkins.jobs().get_config("app-copy").await.unwrap(), config);
}

#[tokio::test]
async fn test_missing_job_is_not_found() {
    let (jenkins, _state) = start_fake().await;

    let err = jenkins.jobs().get_info("ghost").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!jenkins.jobs().is_exists("ghost").await.unwrap());
}

#[tokio::test]
async fn test_view_round_trip() {
    let (jenkins, _state) = start_fake().await;
    let views = jenkins.views();

    views.create("team", "<hudson.model.ListView/>").await.unwrap();
    let listed = views.get_all().await.unwrap();
    assert_eq!(listed.keys().filter(|n| *n == "team").count(), 1);
    assert!(views.is_exists("all").await.unwrap());

    views.delete("team").await.unwrap();
    assert!(!views.is_exists("team").await.unwrap());
}

#[tokio::test]
async fn test_node_round_trip() {
    let (jenkins, _state) = start_fake().await;
    let nodes = jenkins.nodes();

    nodes.create(&NodeConfig::new("agent-1").with_labels("linux")).await.unwrap();
    assert_eq!(nodes.get_all().await.unwrap().keys().filter(|n| *n == "agent-1").count(), 1);
    assert!(nodes.is_exists("agent-1").await.unwrap());

    let again = nodes.create(&NodeConfig::new("agent-1")).await.unwrap_err();
    assert!(again.to_string().contains("already exists"));

    nodes.delete("agent-1").await.unwrap();
    assert!(!nodes.get_all().await.unwrap().contains_key("agent-1"));
    assert!(!nodes.is_exists("agent-1").await.unwrap());
}

#[tokio::test]
async fn test_build_enqueued() {
    let (jenkins, _state) = start_fake().await;
    jenkins.jobs().create("app", &JobConfig::new().to_xml()).await.unwrap();

    let first = jenkins
        .builds()
        .start("app", BuildRequest::new().parameter("BRANCH", "main"))
        .await
        .unwrap();
    let second = jenkins.builds().start("app", BuildRequest::new()).await.unwrap();
    assert_eq!((first, second), (Some(1), Some(2)));

    let queue = jenkins.queue().get_all().await.unwrap();
    assert_eq!(queue.keys().copied().collect::<Vec<_>>(), [1, 2]);
}

#[tokio::test]
async fn test_version_from_root() {
    let (jenkins, _state) = start_fake().await;
    let version = jenkins.get_version().await.unwrap();
    assert_eq!((version.major, version.minor, version.patch, version.build), (2, 414, 3, 0));
    assert!(jenkins.is_ready().await);
}

#[tokio::test]
async fn test_concurrent_calls_share_client() {
    let (jenkins, state) = start_fake().await;
    let config = JobConfig::new().to_xml();

    let creates = (0..8).map(|i| {
        let jenkins = jenkins.clone();
        let config = config.clone();
        async move { jenkins.jobs().create(&format!("job-{}", i), &config).await }
    });
    for result in join_all(creates).await {
        result.unwrap();
    }

    assert_eq!(jenkins.jobs().get_all().await.unwrap().len(), 8);
    // Racing first calls may each probe; later calls reuse the cached crumb.
    let probes = state.lock().crumb_probes;
    assert!((1..=8).contains(&probes));

    jenkins.get_status().await.unwrap();
    assert_eq!(state.lock().crumb_probes, probes);
}

#[tokio::test]
async fn test_close_then_request_fails() {
    let (jenkins, _state) = start_fake().await;
    jenkins.get_status().await.unwrap();
    jenkins.close().await;
    jenkins.close().await;

    let err = jenkins.get_status().await.unwrap_err();
    assert!(matches!(err, crate::error::JenkinsError::Closed));
}
