//! # Provider Modules
//!
//! Capability traits for every cloud API the cleaner talks to.
//!
//! The cleanup engine only ever sees these traits:
//! - `ResourceManager` for folders, projects and liens
//! - `TagManager` for organization tag keys and values
//! - `FirewallPolicies` for folder-scoped hierarchical firewall policies
//! - `ClusterManager` for Kubernetes clusters inside a project
//! - `ServiceEndpoints` for managed services produced by a project
//! - `AssetFeeds`, `SecurityNotifications` and `BillingSinks` for the
//!   organization-level sweeps
//!
//! `gcp` implements all of them over the public REST APIs.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

pub mod error;
pub mod gcp;
pub mod types;

pub use error::{ProviderError, ProviderResult};
pub use types::{
    AssetFeed, Cluster, ClusterStatus, FirewallPolicy, FirewallPolicyAssociation, Folder, Lien,
    LogSink, NotificationConfig, Page, Project, ServiceEndpoint, TagKey, TagValue,
};

/// Folders, projects and liens
#[async_trait]
pub trait ResourceManager: Send + Sync {
    /// List non-deleted child folders of `parent` (`folders/<id>`)
    async fn list_folders(&self, parent: &str, page_token: Option<&str>)
        -> ProviderResult<Page<Folder>>;

    /// Get a folder by resource name
    async fn get_folder(&self, name: &str) -> ProviderResult<Folder>;

    /// Request deletion of an empty folder
    async fn delete_folder(&self, name: &str) -> ProviderResult<()>;

    /// List projects matching a resource manager filter expression
    async fn list_projects(&self, filter: &str, page_token: Option<&str>)
        -> ProviderResult<Page<Project>>;

    /// Get a project by id
    async fn get_project(&self, project_id: &str) -> ProviderResult<Project>;

    /// Request deletion of a project
    async fn delete_project(&self, project_id: &str) -> ProviderResult<()>;

    /// List liens attached to `parent` (`projects/<id>`)
    async fn list_liens(&self, parent: &str, page_token: Option<&str>) -> ProviderResult<Page<Lien>>;

    /// Remove a lien by resource name
    async fn delete_lien(&self, name: &str) -> ProviderResult<()>;
}

/// Organization tag keys and their values
#[async_trait]
pub trait TagManager: Send + Sync {
    async fn list_tag_keys(&self, parent: &str, page_token: Option<&str>)
        -> ProviderResult<Page<TagKey>>;

    async fn list_tag_values(&self, parent: &str, page_token: Option<&str>)
        -> ProviderResult<Page<TagValue>>;

    async fn delete_tag_value(&self, name: &str) -> ProviderResult<()>;

    async fn delete_tag_key(&self, name: &str) -> ProviderResult<()>;
}

/// Hierarchical firewall policies
#[async_trait]
pub trait FirewallPolicies: Send + Sync {
    /// List policies owned by `parent` (`folders/<id>`)
    async fn list_firewall_policies(
        &self,
        parent: &str,
        page_token: Option<&str>,
    ) -> ProviderResult<Page<FirewallPolicy>>;

    /// Detach one association from a policy
    async fn remove_association(&self, policy: &str, association: &str) -> ProviderResult<()>;

    async fn delete_firewall_policy(&self, policy: &str) -> ProviderResult<()>;
}

/// Kubernetes clusters
#[async_trait]
pub trait ClusterManager: Send + Sync {
    /// List clusters of a project across all locations
    async fn list_clusters(&self, project_id: &str) -> ProviderResult<Vec<Cluster>>;

    /// Start asynchronous deletion of a cluster
    async fn delete_cluster(&self, project_id: &str, cluster: &Cluster) -> ProviderResult<()>;
}

/// Managed services produced by a project
#[async_trait]
pub trait ServiceEndpoints: Send + Sync {
    async fn list_services(
        &self,
        project_id: &str,
        page_token: Option<&str>,
    ) -> ProviderResult<Page<ServiceEndpoint>>;

    async fn delete_service(&self, service_name: &str) -> ProviderResult<()>;
}

/// Cloud Asset Inventory feeds
#[async_trait]
pub trait AssetFeeds: Send + Sync {
    /// List feeds of `parent` (`organizations/<id>`); the API does not paginate
    async fn list_feeds(&self, parent: &str) -> ProviderResult<Vec<AssetFeed>>;

    async fn delete_feed(&self, name: &str) -> ProviderResult<()>;
}

/// Security Command Center notification configs
#[async_trait]
pub trait SecurityNotifications: Send + Sync {
    async fn list_notification_configs(
        &self,
        parent: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> ProviderResult<Page<NotificationConfig>>;

    async fn delete_notification_config(&self, name: &str) -> ProviderResult<()>;
}

/// Log sinks of a billing account
#[async_trait]
pub trait BillingSinks: Send + Sync {
    async fn list_sinks(
        &self,
        parent: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> ProviderResult<Page<LogSink>>;

    async fn delete_sink(&self, parent: &str, sink_name: &str) -> ProviderResult<()>;
}

/// Every capability the cleaner needs, bundled for injection
#[derive(Clone)]
pub struct CloudProviders {
    pub resource_manager: Arc<dyn ResourceManager>,
    pub tags: Arc<dyn TagManager>,
    pub firewall_policies: Arc<dyn FirewallPolicies>,
    pub clusters: Arc<dyn ClusterManager>,
    pub service_endpoints: Arc<dyn ServiceEndpoints>,
    pub asset_feeds: Arc<dyn AssetFeeds>,
    pub security_notifications: Arc<dyn SecurityNotifications>,
    pub billing_sinks: Arc<dyn BillingSinks>,
}

impl CloudProviders {
    /// Use one implementation for every capability
    pub fn uniform<P>(provider: Arc<P>) -> Self
    where
        P: ResourceManager
            + TagManager
            + FirewallPolicies
            + ClusterManager
            + ServiceEndpoints
            + AssetFeeds
            + SecurityNotifications
            + BillingSinks
            + 'static,
    {
        Self {
            resource_manager: Arc::clone(&provider) as Arc<dyn ResourceManager>,
            tags: Arc::clone(&provider) as Arc<dyn TagManager>,
            firewall_policies: Arc::clone(&provider) as Arc<dyn FirewallPolicies>,
            clusters: Arc::clone(&provider) as Arc<dyn ClusterManager>,
            service_endpoints: Arc::clone(&provider) as Arc<dyn ServiceEndpoints>,
            asset_feeds: Arc::clone(&provider) as Arc<dyn AssetFeeds>,
            security_notifications: Arc::clone(&provider) as Arc<dyn SecurityNotifications>,
            billing_sinks: provider as Arc<dyn BillingSinks>,
        }
    }
}

impl std::fmt::Debug for CloudProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudProviders").finish_non_exhaustive()
    }
}

/// Drain a paginated list call into one vector
///
/// `fetch` receives the token of the page to load (`None` for the first page).
pub async fn collect_pages<T, F, Fut>(mut fetch: F) -> ProviderResult<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = ProviderResult<Page<T>>>,
{
    let mut items = Vec::new();
    let mut page_token = None;
    loop {
        let page = fetch(page_token.take()).await?;
        items.extend(page.items);
        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => return Ok(items),
        }
    }
}
