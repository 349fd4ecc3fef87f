//! HTTP surface: push trigger, probes and metrics

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{test_config, FakeCloud, Gate};
use project_cleaner::observability::metrics;
use project_cleaner::server::{router, ServerState};
use project_cleaner::Cleaner;
use serde_json::Value;
use std::sync::{Arc, Once};
use tower::ServiceExt;

static METRICS_INIT: Once = Once::new();

fn cloud() -> Arc<FakeCloud> {
    let cloud = Arc::new(FakeCloud::new());
    cloud.add_folder("100", "organizations/1", 1000);
    cloud.add_folder("200", "folders/100", 40);
    cloud.add_project("p1", "200", 30, &[]);
    cloud
}

fn app(cloud: &Arc<FakeCloud>, ready: bool) -> Router {
    let cleaner = Cleaner::new(Arc::new(test_config("100", 24)), cloud.providers());
    let state = Arc::new(ServerState::new(cleaner));
    if ready {
        state.mark_ready();
    }
    router(state)
}

fn push_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_push_message_runs_cleanup() {
    let cloud = cloud();
    let envelope = r#"{
        "message": {"messageId": "42", "publishTime": "2024-01-01T00:00:00Z", "data": "e30="},
        "subscription": "projects/ops/subscriptions/cleaner"
    }"#;

    let response = app(&cloud, true).oneshot(push_request(envelope)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["deleted"], 2);
    assert_eq!(body["failed"], 0);
    assert_eq!(body["deleteCalls"], 2);
    assert_eq!(cloud.project_state("p1").as_deref(), Some("DELETE_REQUESTED"));
}

#[tokio::test]
async fn test_malformed_push_payload_still_runs_cleanup() {
    let cloud = cloud();

    let response = app(&cloud, true)
        .oneshot(push_request("not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!cloud.folder_exists("200"));
}

#[tokio::test]
async fn test_fatal_run_error_returns_500() {
    let cloud = cloud();
    cloud.with_state(|state| {
        state.failing_folder_listings.insert("folders/100".to_string());
    });

    let response = app(&cloud, true).oneshot(push_request("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["status"], "error");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("failed to list sub-folders of folders/100"));
}

#[tokio::test]
async fn test_overlapping_trigger_is_rejected() {
    let gate = Arc::new(Gate::default());
    let cloud = Arc::new(FakeCloud::gated(Arc::clone(&gate)));
    cloud.add_folder("100", "organizations/1", 1000);
    let app = app(&cloud, true);

    let first = tokio::spawn(app.clone().oneshot(push_request("{}")));
    gate.entered.notified().await;

    let second = app.clone().oneshot(push_request("{}")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json_body(second).await["status"], "busy");

    gate.release.notify_one();
    let first = first.await.unwrap().unwrap();
    assert_eq!(first.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_follows_mark_ready() {
    let cloud = cloud();

    let not_ready = app(&cloud, false).oneshot(get("/readyz")).await.unwrap();
    assert_eq!(not_ready.status(), StatusCode::SERVICE_UNAVAILABLE);

    let ready = app(&cloud, true).oneshot(get("/readyz")).await.unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_liveness_always_ok() {
    let response = app(&cloud(), false).oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_exposed_in_text_format() {
    METRICS_INIT.call_once(|| {
        metrics::register_metrics().expect("Failed to register metrics");
    });
    metrics::increment_runs();

    let response = app(&cloud(), true).oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("project_cleaner_runs_total"));
}

#[tokio::test]
async fn test_get_on_trigger_path_not_allowed() {
    let response = app(&cloud(), true).oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
