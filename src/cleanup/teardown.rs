//! # Resource Teardown
//!
//! Dependency-ordered deletion of a project or folder. Every step is
//! best-effort: failures are logged and recorded in the [`RunReport`] and the
//! sequence carries on with whatever can still be attempted.
//!
//! Project order: liens, clusters, project delete, then (on failure) service
//! endpoints and one more project delete.
//! Folder order: firewall policy associations, firewall policies, folder.

use super::report::{ResourceKind, RunReport};
use crate::constants::NON_BLOCKING_ENDPOINT_COUNT;
use crate::provider::{
    collect_pages, ClusterManager, ClusterStatus, CloudProviders, FirewallPolicies,
    FirewallPolicy, Folder, Project, ResourceManager, ServiceEndpoints,
};
use std::time::Duration;
use tracing::{error, info, info_span, warn, Instrument};

/// Tear down one project that passed the combined filter
pub async fn teardown_project(
    providers: &CloudProviders,
    project: &Project,
    settle_delay: Duration,
    report: &mut RunReport,
) {
    let span = info_span!("teardown_project", project.id = %project.project_id);
    async {
        let project_id = project.project_id.as_str();
        info!("Tearing down project");

        remove_liens(providers.resource_manager.as_ref(), project_id, report).await;

        let pending = drain_clusters(providers.clusters.as_ref(), project_id, report).await;
        if pending > 0 {
            // Cluster deletion is asynchronous; the project delete is still issued
            warn!(
                pending_clusters = pending,
                "Clusters are still being deleted, project deletion may be deferred upstream"
            );
        }

        let first_attempt = providers.resource_manager.delete_project(project_id).await;
        let first_error = match &first_attempt {
            Ok(()) => {
                info!("Project deletion requested");
                report.record_delete(ResourceKind::Project, project_id, &first_attempt);
                return;
            }
            Err(e) => e,
        };
        warn!(error = %first_error, "Project deletion failed, cleaning up service endpoints");

        delete_service_endpoints(providers.service_endpoints.as_ref(), project_id, report).await;
        tokio::time::sleep(settle_delay).await;

        let second_attempt = providers.resource_manager.delete_project(project_id).await;
        match &second_attempt {
            Ok(()) => info!("Project deletion requested after endpoint cleanup"),
            Err(e) => error!(error = %e, "Project deletion failed again, giving up for this run"),
        }
        // The first failed attempt counts as a call but not as a failure
        report.record_delete_attempt();
        report.record_delete(ResourceKind::Project, project_id, &second_attempt);
    }
    .instrument(span)
    .await;
}

/// Remove every lien on the project
///
/// A listing failure is logged; the project delete is still attempted.
pub async fn remove_liens(
    resource_manager: &dyn ResourceManager,
    project_id: &str,
    report: &mut RunReport,
) {
    let parent = format!("projects/{project_id}");
    let parent = parent.as_str();
    let liens = match collect_pages(|token| async move {
        resource_manager.list_liens(parent, token.as_deref()).await
    })
    .await
    {
        Ok(liens) => liens,
        Err(e) => {
            warn!(error = %e, "Failed to list liens");
            report.record_failure(ResourceKind::Lien, parent, e);
            return;
        }
    };
    info!(count = liens.len(), "Listed liens");

    for lien in liens {
        let result = resource_manager.delete_lien(&lien.name).await;
        match &result {
            Ok(()) => info!(resource.name = %lien.name, "Removed lien"),
            Err(e) => warn!(resource.name = %lien.name, error = %e, "Failed to remove lien"),
        }
        report.record_delete(ResourceKind::Lien, &lien.name, &result);
    }
}

/// Issue deletes for running clusters and count the ones still draining
///
/// `RUNNING`/`DEGRADED` clusters are deleted; `PROVISIONING`, `RECONCILING`
/// and `STOPPING` ones are already in flight. Both count as pending.
pub async fn drain_clusters(
    clusters: &dyn ClusterManager,
    project_id: &str,
    report: &mut RunReport,
) -> usize {
    let listed = match clusters.list_clusters(project_id).await {
        Ok(listed) => listed,
        Err(e) => {
            warn!(error = %e, "Failed to list clusters");
            report.record_failure(ResourceKind::Cluster, &format!("projects/{project_id}"), e);
            return 0;
        }
    };

    let mut pending = 0;
    for cluster in &listed {
        match cluster.status {
            ClusterStatus::Running | ClusterStatus::Degraded => {
                let result = clusters.delete_cluster(project_id, cluster).await;
                match &result {
                    Ok(()) => info!(resource.name = %cluster.name, status = %cluster.status, "Cluster deletion requested"),
                    Err(e) => warn!(resource.name = %cluster.name, error = %e, "Failed to delete cluster"),
                }
                report.record_delete(ResourceKind::Cluster, &cluster.name, &result);
                pending += 1;
                report.record_pending(ResourceKind::Cluster);
            }
            ClusterStatus::Provisioning | ClusterStatus::Reconciling | ClusterStatus::Stopping => {
                info!(resource.name = %cluster.name, status = %cluster.status, "Cluster operation already in progress");
                pending += 1;
                report.record_pending(ResourceKind::Cluster);
            }
            ClusterStatus::Error | ClusterStatus::Other(_) => {
                info!(resource.name = %cluster.name, status = %cluster.status, "Ignoring cluster");
                report.record_skipped(ResourceKind::Cluster);
            }
        }
    }
    pending
}

/// Delete the managed services produced by a project
///
/// A single endpoint is the project's default one and does not block
/// deletion, so nothing is deleted unless there are more.
pub async fn delete_service_endpoints(
    endpoints: &dyn ServiceEndpoints,
    project_id: &str,
    report: &mut RunReport,
) {
    let services = match collect_pages(|token| async move {
        endpoints.list_services(project_id, token.as_deref()).await
    })
    .await
    {
        Ok(services) => services,
        Err(e) => {
            warn!(error = %e, "Failed to list service endpoints");
            report.record_failure(
                ResourceKind::ServiceEndpoint,
                &format!("projects/{project_id}"),
                e,
            );
            return;
        }
    };

    if services.len() <= NON_BLOCKING_ENDPOINT_COUNT {
        info!(count = services.len(), "No blocking service endpoints");
        return;
    }

    for service in services {
        let result = endpoints.delete_service(&service.service_name).await;
        match &result {
            Ok(()) => info!(resource.name = %service.service_name, "Service endpoint deletion requested"),
            Err(e) => warn!(resource.name = %service.service_name, error = %e, "Failed to delete service endpoint"),
        }
        report.record_delete(ResourceKind::ServiceEndpoint, &service.service_name, &result);
    }
}

/// Tear down one folder that passed the folder guard
pub async fn teardown_folder(providers: &CloudProviders, folder: &Folder, report: &mut RunReport) {
    let span = info_span!("teardown_folder", folder.id = %folder.id());
    async {
        info!("Tearing down folder");
        remove_firewall_policies(providers.firewall_policies.as_ref(), &folder.name, report).await;

        let result = providers.resource_manager.delete_folder(&folder.name).await;
        match &result {
            Ok(()) => info!("Folder deletion requested"),
            // Non-empty folders are expected to fail here
            Err(e) => warn!(error = %e, "Failed to delete folder"),
        }
        report.record_delete(ResourceKind::Folder, &folder.name, &result);
    }
    .instrument(span)
    .await;
}

/// Detach and delete every firewall policy owned by the folder
pub async fn remove_firewall_policies(
    firewall_policies: &dyn FirewallPolicies,
    folder_name: &str,
    report: &mut RunReport,
) {
    let policies = match collect_pages(|token| async move {
        firewall_policies
            .list_firewall_policies(folder_name, token.as_deref())
            .await
    })
    .await
    {
        Ok(policies) => policies,
        Err(e) => {
            warn!(error = %e, "Failed to list firewall policies");
            report.record_failure(ResourceKind::FirewallPolicy, folder_name, e);
            return;
        }
    };

    for policy in &policies {
        remove_firewall_policy(firewall_policies, policy, report).await;
    }
}

/// Detach all associations, then delete the policy
///
/// The first failure stops work on this policy only.
async fn remove_firewall_policy(
    firewall_policies: &dyn FirewallPolicies,
    policy: &FirewallPolicy,
    report: &mut RunReport,
) {
    for association in &policy.associations {
        let result = firewall_policies
            .remove_association(&policy.name, &association.name)
            .await;
        report.record_delete(ResourceKind::FirewallAssociation, &association.name, &result);
        if let Err(e) = result {
            warn!(
                resource.name = %policy.name,
                association = %association.name,
                error = %e,
                "Failed to detach firewall policy association, skipping policy"
            );
            return;
        }
        info!(
            resource.name = %policy.name,
            association = %association.name,
            target = %association.attachment_target,
            "Detached firewall policy association"
        );
    }

    let result = firewall_policies.delete_firewall_policy(&policy.name).await;
    match &result {
        Ok(()) => info!(resource.name = %policy.name, short_name = %policy.short_name, "Firewall policy deletion requested"),
        Err(e) => warn!(resource.name = %policy.name, error = %e, "Failed to delete firewall policy"),
    }
    report.record_delete(ResourceKind::FirewallPolicy, &policy.name, &result);
}
