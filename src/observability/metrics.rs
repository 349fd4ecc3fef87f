//! # Metrics
//!
//! Prometheus metrics for monitoring the cleaner.
//!
//! ## Metrics Exposed
//!
//! - `project_cleaner_runs_total` - Total number of cleanup runs
//! - `project_cleaner_run_failures_total` - Runs aborted by a fatal error
//! - `project_cleaner_run_duration_seconds` - Duration of cleanup runs
//! - `project_cleaner_last_success_timestamp_seconds` - Unix time of the last completed run
//! - `project_cleaner_resources_deleted_total{kind}` - Deletions requested per resource kind
//! - `project_cleaner_resources_failed_total{kind}` - Failed deletions per resource kind
//! - `project_cleaner_resources_skipped_total{kind}` - Resources left alone per resource kind
//! - `project_cleaner_api_requests_total{service}` - Cloud API requests per service
//! - `project_cleaner_api_request_duration_seconds{service}` - Cloud API latency per service
//! - `project_cleaner_api_errors_total{service}` - Failed cloud API requests per service
//! - `project_cleaner_retries_total` - Transient failures retried by the backoff wrapper

use anyhow::Result;
use prometheus::{Histogram, HistogramVec, IntCounter, IntCounterVec, IntGauge, Registry};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RUNS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("project_cleaner_runs_total", "Total number of cleanup runs")
        .expect("Failed to create RUNS_TOTAL metric - this should never happen")
});

static RUN_FAILURES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "project_cleaner_run_failures_total",
        "Total number of cleanup runs aborted by a fatal error",
    )
    .expect("Failed to create RUN_FAILURES_TOTAL metric - this should never happen")
});

static RUN_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "project_cleaner_run_duration_seconds",
            "Duration of cleanup runs in seconds",
        )
        .buckets(vec![1.0, 10.0, 30.0, 60.0, 300.0, 900.0, 1800.0, 3600.0]),
    )
    .expect("Failed to create RUN_DURATION metric - this should never happen")
});

static LAST_SUCCESS_TIMESTAMP: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::new(
        "project_cleaner_last_success_timestamp_seconds",
        "Unix timestamp of the last cleanup run that completed",
    )
    .expect("Failed to create LAST_SUCCESS_TIMESTAMP metric - this should never happen")
});

static RESOURCES_DELETED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "project_cleaner_resources_deleted_total",
            "Total number of deletions requested by resource kind",
        ),
        &["kind"],
    )
    .expect("Failed to create RESOURCES_DELETED_TOTAL metric - this should never happen")
});

static RESOURCES_FAILED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "project_cleaner_resources_failed_total",
            "Total number of failed deletions by resource kind",
        ),
        &["kind"],
    )
    .expect("Failed to create RESOURCES_FAILED_TOTAL metric - this should never happen")
});

static RESOURCES_SKIPPED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "project_cleaner_resources_skipped_total",
            "Total number of resources left in place by resource kind",
        ),
        &["kind"],
    )
    .expect("Failed to create RESOURCES_SKIPPED_TOTAL metric - this should never happen")
});

static API_REQUESTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "project_cleaner_api_requests_total",
            "Total number of cloud API requests by service",
        ),
        &["service"],
    )
    .expect("Failed to create API_REQUESTS_TOTAL metric - this should never happen")
});

static API_REQUEST_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "project_cleaner_api_request_duration_seconds",
            "Duration of cloud API requests in seconds by service",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["service"],
    )
    .expect("Failed to create API_REQUEST_DURATION metric - this should never happen")
});

static API_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "project_cleaner_api_errors_total",
            "Total number of failed cloud API requests by service",
        ),
        &["service"],
    )
    .expect("Failed to create API_ERRORS_TOTAL metric - this should never happen")
});

static RETRIES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "project_cleaner_retries_total",
        "Total number of transient failures retried with backoff",
    )
    .expect("Failed to create RETRIES_TOTAL metric - this should never happen")
});

/// Register all metrics with the process registry
///
/// # Errors
/// Returns an error if a metric is registered twice.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RUNS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RUN_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RUN_DURATION.clone()))?;
    REGISTRY.register(Box::new(LAST_SUCCESS_TIMESTAMP.clone()))?;
    REGISTRY.register(Box::new(RESOURCES_DELETED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RESOURCES_FAILED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RESOURCES_SKIPPED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(API_REQUESTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(API_REQUEST_DURATION.clone()))?;
    REGISTRY.register(Box::new(API_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RETRIES_TOTAL.clone()))?;

    Ok(())
}

/// Render the registry in the Prometheus text exposition format
///
/// # Errors
/// Returns an error if encoding fails.
pub fn gather_text() -> Result<String> {
    use prometheus::Encoder;

    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

pub fn increment_runs() {
    RUNS_TOTAL.inc();
}

pub fn increment_run_failures() {
    RUN_FAILURES_TOTAL.inc();
}

pub fn observe_run_duration(duration: f64) {
    RUN_DURATION.observe(duration);
}

pub fn set_last_success_timestamp(unix_seconds: i64) {
    LAST_SUCCESS_TIMESTAMP.set(unix_seconds);
}

pub fn increment_resources_deleted(kind: &str) {
    RESOURCES_DELETED_TOTAL.with_label_values(&[kind]).inc();
}

pub fn increment_resources_failed(kind: &str) {
    RESOURCES_FAILED_TOTAL.with_label_values(&[kind]).inc();
}

pub fn increment_resources_skipped(kind: &str) {
    RESOURCES_SKIPPED_TOTAL.with_label_values(&[kind]).inc();
}

/// Count one API request and record its latency
pub fn record_api_request(service: &str, duration: f64) {
    API_REQUESTS_TOTAL.with_label_values(&[service]).inc();
    API_REQUEST_DURATION
        .with_label_values(&[service])
        .observe(duration);
}

pub fn increment_api_errors(service: &str) {
    API_ERRORS_TOTAL.with_label_values(&[service]).inc();
}

pub fn increment_retries() {
    RETRIES_TOTAL.inc();
}
