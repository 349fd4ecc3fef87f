//! # HTTP Server
//!
//! HTTP surface of the `serve` mode.
//!
//! Provides endpoints:
//! - `POST /` - Pub/Sub push trigger; runs one cleanup sweep
//! - `/metrics` - Prometheus metrics in text format
//! - `/healthz` - Liveness probe (always returns 200)
//! - `/readyz` - Readiness probe (returns 200 once the cleaner is initialized)
//!
//! Sweeps never overlap: a trigger that arrives while one is running gets
//! `429 Too Many Requests` so Pub/Sub redelivers it later.

use crate::cleanup::Cleaner;
use crate::observability::metrics;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub struct ServerState {
    pub is_ready: AtomicBool,
    cleaner: Cleaner,
    run_lock: Mutex<()>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("is_ready", &self.is_ready.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl ServerState {
    pub fn new(cleaner: Cleaner) -> Self {
        Self {
            is_ready: AtomicBool::new(false),
            cleaner,
            run_lock: Mutex::new(()),
        }
    }

    pub fn mark_ready(&self) {
        self.is_ready.store(true, Ordering::Relaxed);
    }
}

/// Pub/Sub push envelope; only used for logging
#[derive(Debug, Default, Deserialize)]
pub struct PushEnvelope {
    #[serde(default)]
    pub message: PushMessage,
    #[serde(default)]
    pub subscription: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub publish_time: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", post(trigger_handler))
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Serve until the process is stopped
///
/// # Errors
/// Returns an error if the port cannot be bound or the server fails.
pub async fn start_server(port: u16, state: Arc<ServerState>) -> Result<(), anyhow::Error> {
    let app = router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn trigger_handler(State(state): State<Arc<ServerState>>, body: Bytes) -> impl IntoResponse {
    // The payload only identifies the trigger; a malformed one still runs a sweep
    let envelope: PushEnvelope = serde_json::from_slice(&body).unwrap_or_default();
    info!(
        message_id = %envelope.message.message_id,
        publish_time = %envelope.message.publish_time,
        subscription = %envelope.subscription,
        attributes = envelope.message.attributes.len(),
        "Cleanup triggered"
    );

    let Ok(_guard) = state.run_lock.try_lock() else {
        warn!("Cleanup run already in progress, rejecting trigger");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "status": "busy" })),
        );
    };

    match state.cleaner.run().await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "deleted": report.total_deleted(),
                "failed": report.total_failed(),
                "deleteCalls": report.delete_calls(),
            })),
        ),
        Err(e) => {
            error!("Cleanup run failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "error": e.to_string() })),
            )
        }
    }
}

async fn metrics_handler() -> impl IntoResponse {
    match metrics::gather_text() {
        Ok(text) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            text,
        ),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {e}"),
            )
        }
    }
}

async fn healthz_handler() -> impl IntoResponse {
    StatusCode::OK
}

async fn readyz_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    if state.is_ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
