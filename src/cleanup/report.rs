//! # Run Report
//!
//! Outcome of one cleanup run, aggregated per resource kind. Every recording
//! call also feeds the Prometheus counters so the report and `/metrics` never
//! disagree.

use crate::observability::metrics;
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

/// Kinds of resources the cleaner touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Folder,
    Project,
    Lien,
    Cluster,
    ServiceEndpoint,
    FirewallPolicy,
    FirewallAssociation,
    TagKey,
    TagValue,
    AssetFeed,
    SecurityNotification,
    BillingSink,
}

impl ResourceKind {
    /// Metric label value
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Project => "project",
            Self::Lien => "lien",
            Self::Cluster => "cluster",
            Self::ServiceEndpoint => "service_endpoint",
            Self::FirewallPolicy => "firewall_policy",
            Self::FirewallAssociation => "firewall_association",
            Self::TagKey => "tag_key",
            Self::TagValue => "tag_value",
            Self::AssetFeed => "asset_feed",
            Self::SecurityNotification => "security_notification",
            Self::BillingSink => "billing_sink",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters for one resource kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCounts {
    /// Delete requests accepted
    pub deleted: u64,
    /// Delete requests or prerequisite lookups that failed
    pub failed: u64,
    /// Resources inspected and left alone
    pub skipped: u64,
    /// Resources already being deleted asynchronously (clusters)
    pub pending: u64,
}

/// One recorded failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ResourceKind,
    pub resource: String,
    pub message: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.resource, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    counts: BTreeMap<ResourceKind, KindCounts>,
    failures: Vec<Failure>,
    delete_calls: u64,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters for `kind` (all zero if nothing was recorded)
    pub fn counts(&self, kind: ResourceKind) -> KindCounts {
        self.counts.get(&kind).copied().unwrap_or_default()
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Number of delete-like requests issued, successful or not
    pub fn delete_calls(&self) -> u64 {
        self.delete_calls
    }

    pub fn total_deleted(&self) -> u64 {
        self.counts.values().map(|counts| counts.deleted).sum()
    }

    pub fn total_failed(&self) -> u64 {
        self.counts.values().map(|counts| counts.failed).sum()
    }

    /// Record the result of a delete request
    pub fn record_delete<E: fmt::Display>(
        &mut self,
        kind: ResourceKind,
        resource: &str,
        result: &Result<(), E>,
    ) {
        self.delete_calls += 1;
        match result {
            Ok(()) => self.record_deleted(kind),
            Err(e) => self.record_failure(kind, resource, e),
        }
    }

    /// Count a delete request whose outcome is superseded by a later retry
    pub fn record_delete_attempt(&mut self) {
        self.delete_calls += 1;
    }

    pub fn record_deleted(&mut self, kind: ResourceKind) {
        self.entry(kind).deleted += 1;
        metrics::increment_resources_deleted(kind.as_str());
    }

    /// Record a failure that is not itself a delete request (listing, lookups)
    pub fn record_failure(&mut self, kind: ResourceKind, resource: &str, error: impl fmt::Display) {
        self.entry(kind).failed += 1;
        metrics::increment_resources_failed(kind.as_str());
        self.failures.push(Failure {
            kind,
            resource: resource.to_string(),
            message: error.to_string(),
        });
    }

    pub fn record_skipped(&mut self, kind: ResourceKind) {
        self.entry(kind).skipped += 1;
        metrics::increment_resources_skipped(kind.as_str());
    }

    pub fn record_pending(&mut self, kind: ResourceKind) {
        self.entry(kind).pending += 1;
    }

    /// Emit one summary line per kind that saw any activity
    pub fn log_summary(&self) {
        for (kind, counts) in &self.counts {
            info!(
                kind = kind.as_str(),
                deleted = counts.deleted,
                failed = counts.failed,
                skipped = counts.skipped,
                pending = counts.pending,
                "Cleanup summary"
            );
        }
        info!(
            delete_calls = self.delete_calls,
            failures = self.failures.len(),
            "Cleanup run finished"
        );
    }

    fn entry(&mut self, kind: ResourceKind) -> &mut KindCounts {
        self.counts.entry(kind).or_default()
    }
}
