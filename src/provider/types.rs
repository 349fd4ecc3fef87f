//! # Resource Types
//!
//! Snapshots of the cloud resources the cleaner observes. They are produced by
//! list/get calls, never cached across runs, and carry only what the
//! predicates and teardown steps need.

use std::collections::HashMap;
use std::fmt;

/// One page of a paginated list call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Token for the following page; `None` on the last page
    pub next_page_token: Option<String>,
}

/// Node of the resource hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    /// `folders/<id>`
    pub name: String,
    /// `folders/<id>` or `organizations/<id>`
    pub parent: String,
    pub display_name: String,
    /// RFC 3339 creation timestamp
    pub create_time: String,
}

impl Folder {
    /// Numeric id without the `folders/` prefix
    pub fn id(&self) -> &str {
        self.name.strip_prefix("folders/").unwrap_or(&self.name)
    }
}

/// Unit of billing and resource ownership
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub project_id: String,
    /// `ACTIVE`, `DELETE_REQUESTED`, ...
    pub lifecycle_state: String,
    pub labels: HashMap<String, String>,
    /// RFC 3339 creation timestamp
    pub create_time: String,
}

/// Deletion-blocking attachment on a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lien {
    /// `liens/<id>`
    pub name: String,
    pub reason: String,
}

/// Lifecycle status of a Kubernetes cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterStatus {
    Running,
    Degraded,
    Provisioning,
    Reconciling,
    Stopping,
    Error,
    Other(String),
}

impl From<&str> for ClusterStatus {
    fn from(value: &str) -> Self {
        match value {
            "RUNNING" => Self::Running,
            "DEGRADED" => Self::Degraded,
            "PROVISIONING" => Self::Provisioning,
            "RECONCILING" => Self::Reconciling,
            "STOPPING" => Self::Stopping,
            "ERROR" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Running => "RUNNING",
            Self::Degraded => "DEGRADED",
            Self::Provisioning => "PROVISIONING",
            Self::Reconciling => "RECONCILING",
            Self::Stopping => "STOPPING",
            Self::Error => "ERROR",
            Self::Other(other) => other,
        };
        f.write_str(name)
    }
}

/// Kubernetes cluster living in a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub name: String,
    /// Zone or region
    pub location: String,
    pub status: ClusterStatus,
}

/// Managed service registered by a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub service_name: String,
    pub producer_project_id: String,
}

/// Attachment of a firewall policy to a folder or organization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallPolicyAssociation {
    pub name: String,
    pub attachment_target: String,
}

/// Hierarchical firewall policy owned by a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallPolicy {
    /// Numeric policy id
    pub name: String,
    pub short_name: String,
    pub associations: Vec<FirewallPolicyAssociation>,
}

/// Organization-scoped tag key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagKey {
    /// `tagKeys/<id>`
    pub name: String,
    pub short_name: String,
    pub create_time: String,
}

/// Value of a tag key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagValue {
    /// `tagValues/<id>`
    pub name: String,
    pub short_name: String,
}

/// Cloud Asset Inventory feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFeed {
    /// `organizations/<id>/feeds/<feed>`
    pub name: String,
    /// Pub/Sub topic the feed publishes to
    pub topic: Option<String>,
}

/// Security Command Center notification config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    /// `organizations/<id>/notificationConfigs/<config>`
    pub name: String,
    pub pubsub_topic: Option<String>,
}

/// Log sink owned by a billing account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSink {
    /// Short sink name
    pub name: String,
    pub destination: String,
    /// RFC 3339 creation timestamp
    pub create_time: String,
}

/// Last segment of a slash-separated resource name
pub fn short_name(resource_name: &str) -> &str {
    resource_name.rsplit('/').next().unwrap_or(resource_name)
}

/// Project id embedded in a `projects/<project>/topics/<topic>` string
///
/// Accepts full service URLs (`//pubsub.googleapis.com/projects/...`) as well.
pub fn project_from_topic(topic: &str) -> Option<&str> {
    let mut segments = topic.split('/').skip_while(|segment| *segment != "projects");
    segments.next()?;
    segments.next().filter(|project| !project.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_id_strips_prefix() {
        let folder = Folder {
            name: "folders/123".into(),
            parent: "organizations/1".into(),
            display_name: "ci".into(),
            create_time: "2024-01-01T00:00:00Z".into(),
        };
        assert_eq!(folder.id(), "123");
    }

    #[test]
    fn test_project_from_topic() {
        assert_eq!(project_from_topic("projects/p1/topics/t"), Some("p1"));
        assert_eq!(
            project_from_topic("//pubsub.googleapis.com/projects/p2/topics/t"),
            Some("p2")
        );
        assert_eq!(project_from_topic("topics/t"), None);
        assert_eq!(project_from_topic("projects/"), None);
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("organizations/1/feeds/my-feed"), "my-feed");
        assert_eq!(short_name("plain"), "plain");
    }

    #[test]
    fn test_cluster_status_round_trip_names() {
        assert_eq!(ClusterStatus::from("PROVISIONING"), ClusterStatus::Provisioning);
        assert_eq!(
            ClusterStatus::from("STATUS_UNSPECIFIED"),
            ClusterStatus::Other("STATUS_UNSPECIFIED".into())
        );
        assert_eq!(ClusterStatus::Degraded.to_string(), "DEGRADED");
    }
}
