//! # Observability
//!
//! - `metrics`: Prometheus metrics collection
//! - `logging`: tracing subscriber setup (JSON for Cloud Logging, text locally)

pub mod logging;
pub mod metrics;

pub use metrics::*;
