//! JSON payloads of the Google Cloud REST APIs
//!
//! Only the fields the cleaner reads are modelled; everything else in the
//! responses is ignored by serde. Conversions into the provider-neutral
//! types live here too.

use crate::provider::types::{
    AssetFeed, Cluster, ClusterStatus, FirewallPolicy, FirewallPolicyAssociation, Folder, Lien,
    LogSink, NotificationConfig, Project, ServiceEndpoint, TagKey, TagValue,
};
use serde::Deserialize;
use std::collections::HashMap;

// ============================================================================
// Errors and authentication
// ============================================================================

/// GCP API error response wrapper
///
/// API Reference: https://cloud.google.com/apis/design/errors
#[derive(Debug, Deserialize)]
pub(super) struct GcpErrorResponse {
    pub error: GcpError,
}

#[derive(Debug, Deserialize)]
pub(super) struct GcpError {
    pub message: String,
    #[serde(default)]
    pub status: String,
}

/// OAuth2 access token response from the metadata server
#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds
    pub expires_in: u64,
}

// ============================================================================
// Resource Manager
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListFoldersResponse {
    #[serde(default)]
    pub folders: Vec<FolderResource>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FolderResource {
    pub name: String,
    #[serde(default)]
    pub parent: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub create_time: String,
}

impl From<FolderResource> for Folder {
    fn from(folder: FolderResource) -> Self {
        Self {
            name: folder.name,
            parent: folder.parent,
            display_name: folder.display_name,
            create_time: folder.create_time,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListProjectsResponse {
    #[serde(default)]
    pub projects: Vec<ProjectResource>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProjectResource {
    pub project_id: String,
    #[serde(default)]
    pub lifecycle_state: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub create_time: String,
}

impl From<ProjectResource> for Project {
    fn from(project: ProjectResource) -> Self {
        Self {
            project_id: project.project_id,
            lifecycle_state: project.lifecycle_state,
            labels: project.labels,
            create_time: project.create_time,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListLiensResponse {
    #[serde(default)]
    pub liens: Vec<LienResource>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LienResource {
    pub name: String,
    #[serde(default)]
    pub reason: String,
}

impl From<LienResource> for Lien {
    fn from(lien: LienResource) -> Self {
        Self {
            name: lien.name,
            reason: lien.reason,
        }
    }
}

// ============================================================================
// Tags
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListTagKeysResponse {
    #[serde(default)]
    pub tag_keys: Vec<TagKeyResource>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TagKeyResource {
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub create_time: String,
}

impl From<TagKeyResource> for TagKey {
    fn from(key: TagKeyResource) -> Self {
        Self {
            name: key.name,
            short_name: key.short_name,
            create_time: key.create_time,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListTagValuesResponse {
    #[serde(default)]
    pub tag_values: Vec<TagValueResource>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TagValueResource {
    pub name: String,
    #[serde(default)]
    pub short_name: String,
}

impl From<TagValueResource> for TagValue {
    fn from(value: TagValueResource) -> Self {
        Self {
            name: value.name,
            short_name: value.short_name,
        }
    }
}

// ============================================================================
// Compute (hierarchical firewall policies)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FirewallPolicyList {
    #[serde(default)]
    pub items: Vec<FirewallPolicyResource>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FirewallPolicyResource {
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub associations: Vec<AssociationResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AssociationResource {
    pub name: String,
    #[serde(default)]
    pub attachment_target: String,
}

impl From<FirewallPolicyResource> for FirewallPolicy {
    fn from(policy: FirewallPolicyResource) -> Self {
        Self {
            name: policy.name,
            short_name: policy.short_name,
            associations: policy
                .associations
                .into_iter()
                .map(|association| FirewallPolicyAssociation {
                    name: association.name,
                    attachment_target: association.attachment_target,
                })
                .collect(),
        }
    }
}

// ============================================================================
// Kubernetes Engine
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub(super) struct ListClustersResponse {
    #[serde(default)]
    pub clusters: Vec<ClusterResource>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ClusterResource {
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: String,
}

impl From<ClusterResource> for Cluster {
    fn from(cluster: ClusterResource) -> Self {
        Self {
            status: ClusterStatus::from(cluster.status.as_str()),
            name: cluster.name,
            location: cluster.location,
        }
    }
}

// ============================================================================
// Service Management
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListServicesResponse {
    #[serde(default)]
    pub services: Vec<ManagedServiceResource>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ManagedServiceResource {
    pub service_name: String,
    #[serde(default)]
    pub producer_project_id: String,
}

impl From<ManagedServiceResource> for ServiceEndpoint {
    fn from(service: ManagedServiceResource) -> Self {
        Self {
            service_name: service.service_name,
            producer_project_id: service.producer_project_id,
        }
    }
}

// ============================================================================
// Cloud Asset Inventory
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub(super) struct ListFeedsResponse {
    #[serde(default)]
    pub feeds: Vec<FeedResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FeedResource {
    pub name: String,
    pub feed_output_config: Option<FeedOutputConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FeedOutputConfig {
    pub pubsub_destination: Option<PubsubDestination>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PubsubDestination {
    pub topic: Option<String>,
}

impl From<FeedResource> for AssetFeed {
    fn from(feed: FeedResource) -> Self {
        Self {
            name: feed.name,
            topic: feed
                .feed_output_config
                .and_then(|config| config.pubsub_destination)
                .and_then(|destination| destination.topic),
        }
    }
}

// ============================================================================
// Security Command Center
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListNotificationConfigsResponse {
    #[serde(default)]
    pub notification_configs: Vec<NotificationConfigResource>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NotificationConfigResource {
    pub name: String,
    pub pubsub_topic: Option<String>,
}

impl From<NotificationConfigResource> for NotificationConfig {
    fn from(config: NotificationConfigResource) -> Self {
        Self {
            name: config.name,
            pubsub_topic: config.pubsub_topic,
        }
    }
}

// ============================================================================
// Cloud Logging
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListSinksResponse {
    #[serde(default)]
    pub sinks: Vec<LogSinkResource>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LogSinkResource {
    pub name: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub create_time: String,
}

impl From<LogSinkResource> for LogSink {
    fn from(sink: LogSinkResource) -> Self {
        Self {
            name: sink.name,
            destination: sink.destination,
            create_time: sink.create_time,
        }
    }
}
