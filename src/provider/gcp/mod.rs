//! # GCP REST Providers
//!
//! Native REST implementation of every capability trait over the public
//! Google Cloud APIs. All services share one [`GcpClient`] which handles
//! authentication, error mapping and request metrics.
//!
//! Deletions return long-running operations that are never polled: the
//! cleaner only needs the request to be accepted, and the next run observes
//! whatever is left.
//!
//! References:
//! - [Resource Manager v1/v3](https://cloud.google.com/resource-manager/reference/rest)
//! - [Compute firewallPolicies](https://cloud.google.com/compute/docs/reference/rest/v1/firewallPolicies)
//! - [Kubernetes Engine](https://cloud.google.com/kubernetes-engine/docs/reference/rest)
//! - [Service Management](https://cloud.google.com/service-infrastructure/docs/service-management/reference/rest)
//! - [Cloud Asset feeds](https://cloud.google.com/asset-inventory/docs/reference/rest/v1/feeds)
//! - [Security Command Center](https://cloud.google.com/security-command-center/docs/reference/rest)
//! - [Cloud Logging sinks](https://cloud.google.com/logging/docs/reference/v2/rest/v2/billingAccounts.sinks)

mod asset;
mod client;
mod compute;
mod container;
mod logging;
mod resource_manager;
mod responses;
mod security_center;
mod service_management;
mod tags;

pub use client::{GcpClient, GcpEndpoints};

/// Service labels used in errors and metrics
pub(crate) mod service {
    pub const RESOURCE_MANAGER: &str = "resource-manager";
    pub const COMPUTE: &str = "compute";
    pub const CONTAINER: &str = "container";
    pub const SERVICE_MANAGEMENT: &str = "service-management";
    pub const CLOUD_ASSET: &str = "cloud-asset";
    pub const SECURITY_CENTER: &str = "security-center";
    pub const LOGGING: &str = "logging";
}
