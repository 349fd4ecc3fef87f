//! Common test utilities
//!
//! - rustls crypto provider setup for tests that open HTTP clients
//! - `FakeCloud`: an in-memory cloud implementing every provider trait,
//!   recording each call and supporting failure injection

#![allow(dead_code, reason = "Each test binary uses a different subset of helpers")]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use project_cleaner::provider::*;
use project_cleaner::CleanupConfig;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, Once};
use tokio::sync::Notify;

static RUSTLS_INIT: Once = Once::new();

/// Initialize rustls crypto provider for tests
///
/// Uses a `Once` to ensure it's only called once across all tests.
pub fn init_rustls() {
    RUSTLS_INIT.call_once(project_cleaner::runtime::install_crypto_provider);
}

/// RFC 3339 timestamp `hours` in the past
pub fn hours_ago(hours: i64) -> String {
    (Utc::now() - Duration::hours(hours)).to_rfc3339()
}

/// Folder sweep config with every delay set to zero
pub fn test_config(root_folder_id: &str, max_age_hours: i64) -> CleanupConfig {
    let mut config = CleanupConfig::new(root_folder_id, max_age_hours);
    config.retry_initial_delay = std::time::Duration::ZERO;
    config.endpoint_settle_delay = std::time::Duration::ZERO;
    config
}

/// Holds the root folder lookup until released
#[derive(Debug, Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

#[derive(Debug, Default)]
pub struct CloudState {
    pub folders: BTreeMap<String, Folder>,
    pub projects: BTreeMap<String, (String, Project)>,
    pub liens: HashMap<String, Vec<Lien>>,
    pub clusters: HashMap<String, Vec<Cluster>>,
    pub services: HashMap<String, Vec<ServiceEndpoint>>,
    pub firewall_policies: HashMap<String, Vec<FirewallPolicy>>,
    pub tag_keys: Vec<TagKey>,
    pub tag_values: HashMap<String, Vec<TagValue>>,
    pub feeds: Vec<AssetFeed>,
    pub notifications: Vec<NotificationConfig>,
    pub sinks: Vec<LogSink>,

    /// Parents whose sub-folder listing fails
    pub failing_folder_listings: HashSet<String>,
    /// Statuses returned by the next project listings before they succeed
    pub project_listing_failures: VecDeque<u16>,
    /// Remaining failing `delete_project` calls per project
    pub project_delete_failures: HashMap<String, u32>,
    /// Resource names whose delete/detach fails
    pub failing_deletes: HashSet<String>,
    /// Parents whose listing of liens, clusters, services or values fails
    pub failing_listings: HashSet<String>,

    /// Every call, in order (`"delete_project p1"`)
    pub calls: Vec<String>,
}

/// In-memory cloud
#[derive(Debug, Default)]
pub struct FakeCloud {
    state: Mutex<CloudState>,
    gate: Option<Arc<Gate>>,
}

const FOLDER_PAGE_SIZE: usize = 2;

fn denied<T>(what: &str) -> ProviderResult<T> {
    Err(ProviderError::api("fake", 403, format!("permission denied: {what}")))
}

fn not_found<T>(what: &str) -> ProviderResult<T> {
    Err(ProviderError::api("fake", 404, format!("not found: {what}")))
}

/// Slice `items` into fake pages; the token is the next offset
fn paginate<T: Clone>(items: &[T], page_token: Option<&str>, page_size: usize) -> Page<T> {
    let start = page_token.and_then(|t| t.parse().ok()).unwrap_or(0);
    let end = (start + page_size).min(items.len());
    Page {
        items: items[start.min(end)..end].to_vec(),
        next_page_token: (end < items.len()).then(|| end.to_string()),
    }
}

impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cloud whose root folder lookup waits on `gate`
    pub fn gated(gate: Arc<Gate>) -> Self {
        Self {
            state: Mutex::default(),
            gate: Some(gate),
        }
    }

    pub fn providers(self: &Arc<Self>) -> CloudProviders {
        CloudProviders::uniform(Arc::clone(self))
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut CloudState) -> R) -> R {
        let mut state = self.state.lock().expect("fake cloud state poisoned");
        f(&mut state)
    }

    fn record(&self, call: String) {
        self.with_state(|state| state.calls.push(call));
    }

    pub fn calls(&self) -> Vec<String> {
        self.with_state(|state| state.calls.clone())
    }

    /// Delete-like calls (deletes and association removals)
    pub fn delete_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with("delete_") || call.starts_with("remove_"))
            .collect()
    }

    pub fn position(&self, call: &str) -> Option<usize> {
        self.calls().iter().position(|c| c == call)
    }

    // ------------------------------------------------------------------
    // Builders
    // ------------------------------------------------------------------

    pub fn add_folder(&self, id: &str, parent: &str, age_hours: i64) {
        self.with_state(|state| {
            state.folders.insert(
                format!("folders/{id}"),
                Folder {
                    name: format!("folders/{id}"),
                    parent: parent.to_string(),
                    display_name: format!("folder-{id}"),
                    create_time: hours_ago(age_hours),
                },
            );
        });
    }

    pub fn add_project(&self, project_id: &str, folder_id: &str, age_hours: i64, labels: &[(&str, &str)]) {
        self.add_project_in_state(project_id, folder_id, age_hours, labels, "ACTIVE");
    }

    pub fn add_project_in_state(
        &self,
        project_id: &str,
        folder_id: &str,
        age_hours: i64,
        labels: &[(&str, &str)],
        lifecycle_state: &str,
    ) {
        self.with_state(|state| {
            state.projects.insert(
                project_id.to_string(),
                (
                    format!("folders/{folder_id}"),
                    Project {
                        project_id: project_id.to_string(),
                        lifecycle_state: lifecycle_state.to_string(),
                        labels: labels
                            .iter()
                            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                            .collect(),
                        create_time: hours_ago(age_hours),
                    },
                ),
            );
        });
    }

    pub fn project_state(&self, project_id: &str) -> Option<String> {
        self.with_state(|state| {
            state
                .projects
                .get(project_id)
                .map(|(_, project)| project.lifecycle_state.clone())
        })
    }

    pub fn folder_exists(&self, id: &str) -> bool {
        self.with_state(|state| state.folders.contains_key(&format!("folders/{id}")))
    }

    pub fn add_lien(&self, project_id: &str, lien_id: &str) {
        self.with_state(|state| {
            state.liens.entry(project_id.to_string()).or_default().push(Lien {
                name: format!("liens/{lien_id}"),
                reason: "test".to_string(),
            });
        });
    }

    pub fn add_cluster(&self, project_id: &str, name: &str, status: &str) {
        self.with_state(|state| {
            state
                .clusters
                .entry(project_id.to_string())
                .or_default()
                .push(Cluster {
                    name: name.to_string(),
                    location: "europe-west1".to_string(),
                    status: ClusterStatus::from(status),
                });
        });
    }

    pub fn add_service(&self, project_id: &str, service_name: &str) {
        self.with_state(|state| {
            state
                .services
                .entry(project_id.to_string())
                .or_default()
                .push(ServiceEndpoint {
                    service_name: service_name.to_string(),
                    producer_project_id: project_id.to_string(),
                });
        });
    }

    pub fn add_firewall_policy(&self, folder_id: &str, policy: &str, associations: &[&str]) {
        self.with_state(|state| {
            state
                .firewall_policies
                .entry(format!("folders/{folder_id}"))
                .or_default()
                .push(FirewallPolicy {
                    name: policy.to_string(),
                    short_name: format!("{policy}-short"),
                    associations: associations
                        .iter()
                        .map(|name| FirewallPolicyAssociation {
                            name: (*name).to_string(),
                            attachment_target: format!("folders/{folder_id}"),
                        })
                        .collect(),
                });
        });
    }

    pub fn add_tag_key(&self, id: &str, short_name: &str, age_hours: i64, values: &[&str]) {
        self.with_state(|state| {
            let name = format!("tagKeys/{id}");
            state.tag_keys.push(TagKey {
                name: name.clone(),
                short_name: short_name.to_string(),
                create_time: hours_ago(age_hours),
            });
            state.tag_values.insert(
                name,
                values
                    .iter()
                    .map(|value| TagValue {
                        name: format!("tagValues/{value}"),
                        short_name: (*value).to_string(),
                    })
                    .collect(),
            );
        });
    }

    pub fn add_feed(&self, organization_id: &str, feed: &str, topic_project: Option<&str>) {
        self.with_state(|state| {
            state.feeds.push(AssetFeed {
                name: format!("organizations/{organization_id}/feeds/{feed}"),
                topic: topic_project.map(|project| format!("projects/{project}/topics/assets")),
            });
        });
    }

    pub fn add_notification(&self, organization_id: &str, config: &str, topic_project: Option<&str>) {
        self.with_state(|state| {
            state.notifications.push(NotificationConfig {
                name: format!("organizations/{organization_id}/notificationConfigs/{config}"),
                pubsub_topic: topic_project
                    .map(|project| format!("projects/{project}/topics/findings")),
            });
        });
    }

    pub fn add_sink(&self, name: &str, age_hours: i64) {
        self.with_state(|state| {
            state.sinks.push(LogSink {
                name: name.to_string(),
                destination: "storage.googleapis.com/bucket".to_string(),
                create_time: hours_ago(age_hours),
            });
        });
    }

    fn fails(&self, name: &str) -> bool {
        self.with_state(|state| state.failing_deletes.contains(name))
    }

    fn listing_fails(&self, parent: &str) -> bool {
        self.with_state(|state| state.failing_listings.contains(parent))
    }
}

#[async_trait]
impl ResourceManager for FakeCloud {
    async fn list_folders(&self, parent: &str, page_token: Option<&str>) -> ProviderResult<Page<Folder>> {
        self.record(format!("list_folders {parent}"));
        self.with_state(|state| {
            if state.failing_folder_listings.contains(parent) {
                return denied(parent);
            }
            let children: Vec<Folder> = state
                .folders
                .values()
                .filter(|folder| folder.parent == parent)
                .cloned()
                .collect();
            Ok(paginate(&children, page_token, FOLDER_PAGE_SIZE))
        })
    }

    async fn get_folder(&self, name: &str) -> ProviderResult<Folder> {
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.record(format!("get_folder {name}"));
        self.with_state(|state| match state.folders.get(name) {
            Some(folder) => Ok(folder.clone()),
            None => not_found(name),
        })
    }

    async fn delete_folder(&self, name: &str) -> ProviderResult<()> {
        self.record(format!("delete_folder {name}"));
        self.with_state(|state| {
            if state.failing_deletes.contains(name) {
                return denied(name);
            }
            if !state.folders.contains_key(name) {
                return not_found(name);
            }
            let has_children = state.folders.values().any(|folder| folder.parent == name);
            let has_active_projects = state
                .projects
                .values()
                .any(|(parent, project)| parent == name && project.lifecycle_state == "ACTIVE");
            if has_children || has_active_projects {
                return Err(ProviderError::api("fake", 400, "folder is not empty"));
            }
            state.folders.remove(name);
            Ok(())
        })
    }

    async fn list_projects(&self, filter: &str, page_token: Option<&str>) -> ProviderResult<Page<Project>> {
        self.record(format!("list_projects {filter}"));
        self.with_state(|state| {
            if let Some(status) = state.project_listing_failures.pop_front() {
                return Err(ProviderError::api("fake", status, "listing failed"));
            }
            let folder_id = filter
                .split_whitespace()
                .find_map(|term| term.strip_prefix("parent.id:"))
                .unwrap_or_default();
            let parent = format!("folders/{folder_id}");
            let projects: Vec<Project> = state
                .projects
                .values()
                .filter(|(project_parent, _)| *project_parent == parent)
                .map(|(_, project)| project.clone())
                .collect();
            Ok(paginate(&projects, page_token, 2))
        })
    }

    async fn get_project(&self, project_id: &str) -> ProviderResult<Project> {
        self.record(format!("get_project {project_id}"));
        self.with_state(|state| match state.projects.get(project_id) {
            Some((_, project)) => Ok(project.clone()),
            None => denied(project_id),
        })
    }

    async fn delete_project(&self, project_id: &str) -> ProviderResult<()> {
        self.record(format!("delete_project {project_id}"));
        self.with_state(|state| {
            if let Some(remaining) = state.project_delete_failures.get_mut(project_id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(ProviderError::api(
                        "fake",
                        400,
                        "project has active service endpoints",
                    ));
                }
            }
            if state.liens.get(project_id).is_some_and(|liens| !liens.is_empty()) {
                return Err(ProviderError::api("fake", 412, "project has liens"));
            }
            match state.projects.get_mut(project_id) {
                Some((_, project)) => {
                    project.lifecycle_state = "DELETE_REQUESTED".to_string();
                    Ok(())
                }
                None => not_found(project_id),
            }
        })
    }

    async fn list_liens(&self, parent: &str, page_token: Option<&str>) -> ProviderResult<Page<Lien>> {
        self.record(format!("list_liens {parent}"));
        if self.listing_fails(parent) {
            return denied(parent);
        }
        let project_id = parent.trim_start_matches("projects/");
        self.with_state(|state| {
            let liens = state.liens.get(project_id).cloned().unwrap_or_default();
            Ok(paginate(&liens, page_token, 10))
        })
    }

    async fn delete_lien(&self, name: &str) -> ProviderResult<()> {
        self.record(format!("delete_lien {name}"));
        if self.fails(name) {
            return denied(name);
        }
        self.with_state(|state| {
            for liens in state.liens.values_mut() {
                liens.retain(|lien| lien.name != name);
            }
        });
        Ok(())
    }
}

#[async_trait]
impl TagManager for FakeCloud {
    async fn list_tag_keys(&self, parent: &str, page_token: Option<&str>) -> ProviderResult<Page<TagKey>> {
        self.record(format!("list_tag_keys {parent}"));
        self.with_state(|state| Ok(paginate(&state.tag_keys, page_token, 10)))
    }

    async fn list_tag_values(&self, parent: &str, page_token: Option<&str>) -> ProviderResult<Page<TagValue>> {
        self.record(format!("list_tag_values {parent}"));
        if self.listing_fails(parent) {
            return denied(parent);
        }
        self.with_state(|state| {
            let values = state.tag_values.get(parent).cloned().unwrap_or_default();
            Ok(paginate(&values, page_token, 10))
        })
    }

    async fn delete_tag_value(&self, name: &str) -> ProviderResult<()> {
        self.record(format!("delete_tag_value {name}"));
        if self.fails(name) {
            return denied(name);
        }
        self.with_state(|state| {
            for values in state.tag_values.values_mut() {
                values.retain(|value| value.name != name);
            }
        });
        Ok(())
    }

    async fn delete_tag_key(&self, name: &str) -> ProviderResult<()> {
        self.record(format!("delete_tag_key {name}"));
        if self.fails(name) {
            return denied(name);
        }
        self.with_state(|state| {
            if state.tag_values.get(name).is_some_and(|values| !values.is_empty()) {
                return Err(ProviderError::api("fake", 400, "tag key still has values"));
            }
            state.tag_keys.retain(|key| key.name != name);
            Ok(())
        })
    }
}

#[async_trait]
impl FirewallPolicies for FakeCloud {
    async fn list_firewall_policies(
        &self,
        parent: &str,
        page_token: Option<&str>,
    ) -> ProviderResult<Page<FirewallPolicy>> {
        self.record(format!("list_firewall_policies {parent}"));
        if self.listing_fails(parent) {
            return denied(parent);
        }
        self.with_state(|state| {
            let policies = state.firewall_policies.get(parent).cloned().unwrap_or_default();
            Ok(paginate(&policies, page_token, 10))
        })
    }

    async fn remove_association(&self, policy: &str, association: &str) -> ProviderResult<()> {
        self.record(format!("remove_association {policy} {association}"));
        if self.fails(association) {
            return denied(association);
        }
        self.with_state(|state| {
            for policies in state.firewall_policies.values_mut() {
                for candidate in policies.iter_mut().filter(|p| p.name == policy) {
                    candidate.associations.retain(|a| a.name != association);
                }
            }
        });
        Ok(())
    }

    async fn delete_firewall_policy(&self, policy: &str) -> ProviderResult<()> {
        self.record(format!("delete_firewall_policy {policy}"));
        if self.fails(policy) {
            return denied(policy);
        }
        self.with_state(|state| {
            for policies in state.firewall_policies.values_mut() {
                policies.retain(|p| p.name != policy);
            }
        });
        Ok(())
    }
}

#[async_trait]
impl ClusterManager for FakeCloud {
    async fn list_clusters(&self, project_id: &str) -> ProviderResult<Vec<Cluster>> {
        self.record(format!("list_clusters {project_id}"));
        if self.listing_fails(project_id) {
            return denied(project_id);
        }
        self.with_state(|state| Ok(state.clusters.get(project_id).cloned().unwrap_or_default()))
    }

    async fn delete_cluster(&self, project_id: &str, cluster: &Cluster) -> ProviderResult<()> {
        self.record(format!("delete_cluster {project_id} {}", cluster.name));
        if self.fails(&cluster.name) {
            return denied(&cluster.name);
        }
        self.with_state(|state| {
            if let Some(clusters) = state.clusters.get_mut(project_id) {
                for candidate in clusters.iter_mut().filter(|c| c.name == cluster.name) {
                    candidate.status = ClusterStatus::Stopping;
                }
            }
        });
        Ok(())
    }
}

#[async_trait]
impl ServiceEndpoints for FakeCloud {
    async fn list_services(
        &self,
        project_id: &str,
        page_token: Option<&str>,
    ) -> ProviderResult<Page<ServiceEndpoint>> {
        self.record(format!("list_services {project_id}"));
        if self.listing_fails(project_id) {
            return denied(project_id);
        }
        self.with_state(|state| {
            let services = state.services.get(project_id).cloned().unwrap_or_default();
            Ok(paginate(&services, page_token, 10))
        })
    }

    async fn delete_service(&self, service_name: &str) -> ProviderResult<()> {
        self.record(format!("delete_service {service_name}"));
        if self.fails(service_name) {
            return denied(service_name);
        }
        self.with_state(|state| {
            for services in state.services.values_mut() {
                services.retain(|s| s.service_name != service_name);
            }
        });
        Ok(())
    }
}

#[async_trait]
impl AssetFeeds for FakeCloud {
    async fn list_feeds(&self, parent: &str) -> ProviderResult<Vec<AssetFeed>> {
        self.record(format!("list_feeds {parent}"));
        if self.listing_fails(parent) {
            return denied(parent);
        }
        self.with_state(|state| Ok(state.feeds.clone()))
    }

    async fn delete_feed(&self, name: &str) -> ProviderResult<()> {
        self.record(format!("delete_feed {name}"));
        if self.fails(name) {
            return denied(name);
        }
        self.with_state(|state| state.feeds.retain(|feed| feed.name != name));
        Ok(())
    }
}

#[async_trait]
impl SecurityNotifications for FakeCloud {
    async fn list_notification_configs(
        &self,
        parent: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> ProviderResult<Page<NotificationConfig>> {
        self.record(format!("list_notification_configs {parent} {page_size}"));
        self.with_state(|state| {
            Ok(paginate(
                &state.notifications,
                page_token,
                usize::try_from(page_size).unwrap_or(usize::MAX),
            ))
        })
    }

    async fn delete_notification_config(&self, name: &str) -> ProviderResult<()> {
        self.record(format!("delete_notification_config {name}"));
        if self.fails(name) {
            return denied(name);
        }
        self.with_state(|state| state.notifications.retain(|n| n.name != name));
        Ok(())
    }
}

#[async_trait]
impl BillingSinks for FakeCloud {
    async fn list_sinks(
        &self,
        parent: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> ProviderResult<Page<LogSink>> {
        self.record(format!("list_sinks {parent} {page_size}"));
        self.with_state(|state| {
            Ok(paginate(
                &state.sinks,
                page_token,
                usize::try_from(page_size).unwrap_or(usize::MAX),
            ))
        })
    }

    async fn delete_sink(&self, parent: &str, sink_name: &str) -> ProviderResult<()> {
        self.record(format!("delete_sink {parent} {sink_name}"));
        if self.fails(sink_name) {
            return denied(sink_name);
        }
        self.with_state(|state| state.sinks.retain(|sink| sink.name != sink_name));
        Ok(())
    }
}
