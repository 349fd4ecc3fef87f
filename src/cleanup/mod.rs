//! # Cleanup
//!
//! The cleanup engine: folder traversal with per-project and per-folder
//! teardown, followed by the organization-level sweepers.
//!
//! [`Cleaner`] owns the configuration and the cloud capabilities; one call to
//! [`Cleaner::run`] is one complete, stateless sweep. Nothing is cached
//! between runs, so a restarted run re-lists everything and relies on deletes
//! being idempotent.

pub mod error;
pub mod predicates;
pub mod report;
pub mod retry;
pub mod sweepers;
pub mod teardown;
pub mod traversal;

pub use error::CleanupError;
pub use report::{KindCounts, ResourceKind, RunReport};

use crate::config::CleanupConfig;
use crate::observability::metrics;
use crate::provider::CloudProviders;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};
use traversal::Traversal;

/// Runs cleanup sweeps against one folder tree and organization
#[derive(Debug, Clone)]
pub struct Cleaner {
    config: Arc<CleanupConfig>,
    providers: CloudProviders,
}

impl Cleaner {
    pub fn new(config: Arc<CleanupConfig>, providers: CloudProviders) -> Self {
        Self { config, providers }
    }

    /// Run one sweep with the age cutoff taken from the current time
    ///
    /// # Errors
    /// Returns [`CleanupError`] if the folder tree could not be walked.
    pub async fn run(&self) -> Result<RunReport, CleanupError> {
        let cutoff = self.config.cutoff_at(Utc::now());
        self.run_with_cutoff(cutoff).await
    }

    /// Run one sweep treating everything created before `cutoff` as old
    ///
    /// # Errors
    /// Returns [`CleanupError`] if the folder tree could not be walked.
    pub async fn run_with_cutoff(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<RunReport, CleanupError> {
        let span = info_span!(
            "cleanup_run",
            root = %self.config.root_folder_name(),
            cutoff = %cutoff
        );
        async {
            let start = Instant::now();
            metrics::increment_runs();
            info!(
                max_project_age_hours = self.config.max_project_age_hours,
                "Starting cleanup run"
            );

            let mut report = RunReport::new();
            let traversal = Traversal::new(&self.config, &self.providers, cutoff)
                .run(&mut report)
                .await;
            if let Err(e) = traversal {
                error!(error = %e, "Cleanup run aborted");
                metrics::increment_run_failures();
                metrics::observe_run_duration(start.elapsed().as_secs_f64());
                return Err(e);
            }

            if self.config.org_sweeps_enabled() {
                sweepers::run_all(&self.config, &self.providers, cutoff, &mut report).await;
            }

            report.log_summary();
            metrics::observe_run_duration(start.elapsed().as_secs_f64());
            metrics::set_last_success_timestamp(Utc::now().timestamp());
            Ok(report)
        }
        .instrument(span)
        .await
    }
}
