//! # Project Cleaner
//!
//! Scheduled sweeper for a Google Cloud folder hierarchy. Starting from a root
//! folder it walks every sub-folder depth-first, tears down projects that are
//! old enough and match the label filters, deletes the folders left empty, and
//! optionally sweeps organization-level resources (tag keys, SCC notification
//! configs, CAI feeds, billing account log sinks) that point at deleted
//! projects.
//!
//! - `config`: configuration loaded once from the environment
//! - `provider`: capability traits and their GCP REST implementation
//! - `cleanup`: traversal, teardown, retry and sweepers
//! - `server`: Pub/Sub push trigger, metrics and probes
//! - `runtime`: process initialization

pub mod cleanup;
pub mod config;
pub mod constants;
pub mod observability;
pub mod provider;
pub mod runtime;
pub mod server;

pub use cleanup::{Cleaner, CleanupError, ResourceKind, RunReport};
pub use config::{CleanupConfig, ConfigError};
