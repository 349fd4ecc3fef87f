//! # Organization Sweepers
//!
//! Independent passes over organization and billing-account scoped resources,
//! each gated by its own `CLEAN_UP_*` flag. They run after the folder
//! traversal, in a fixed order, and never abort each other: every failure is
//! logged and recorded.
//!
//! - tag keys past the age cutoff (values first, then the key)
//! - SCC notification configs and CAI feeds whose name matches an include
//!   pattern and whose topic project is already `DELETE_REQUESTED`
//! - billing account log sinks past the age cutoff matching an include pattern

use super::predicates::{age_eligible, name_eligible, referenced_project_eligible};
use super::report::{ResourceKind, RunReport};
use crate::config::CleanupConfig;
use crate::constants::RESERVED_SINK_NAMES;
use crate::provider::types::{project_from_topic, short_name};
use crate::provider::{collect_pages, CloudProviders, ResourceManager, TagKey, TagManager};
use chrono::{DateTime, Utc};
use tracing::{debug, info, info_span, warn, Instrument};

/// Run every enabled sweeper
pub async fn run_all(
    config: &CleanupConfig,
    providers: &CloudProviders,
    cutoff: DateTime<Utc>,
    report: &mut RunReport,
) {
    if config.clean_up_tag_keys {
        sweep_tag_keys(config, providers, cutoff, report)
            .instrument(info_span!("sweep_tag_keys"))
            .await;
    }
    if config.clean_up_scc_notifications {
        sweep_security_notifications(config, providers, report)
            .instrument(info_span!("sweep_security_notifications"))
            .await;
    }
    if config.clean_up_cai_feeds {
        sweep_asset_feeds(config, providers, report)
            .instrument(info_span!("sweep_asset_feeds"))
            .await;
    }
    if config.clean_up_billing_sinks {
        sweep_billing_sinks(config, providers, cutoff, report)
            .instrument(info_span!("sweep_billing_sinks"))
            .await;
    }
}

/// Delete old tag keys that are not excluded, together with their values
pub async fn sweep_tag_keys(
    config: &CleanupConfig,
    providers: &CloudProviders,
    cutoff: DateTime<Utc>,
    report: &mut RunReport,
) {
    let Some(organization) = config.organization_name() else {
        warn!("Tag key cleanup enabled without an organization, skipping");
        return;
    };
    let tags = providers.tags.as_ref();
    let parent = organization.as_str();

    let keys = match collect_pages(|token| async move {
        tags.list_tag_keys(parent, token.as_deref()).await
    })
    .await
    {
        Ok(keys) => keys,
        Err(e) => {
            warn!(error = %e, "Failed to list tag keys");
            report.record_failure(ResourceKind::TagKey, parent, e);
            return;
        }
    };
    info!(count = keys.len(), "Listed tag keys");

    for key in &keys {
        if config.excluded_tag_keys.contains(&key.short_name) {
            debug!(resource.name = %key.name, short_name = %key.short_name, "Tag key excluded");
            report.record_skipped(ResourceKind::TagKey);
            continue;
        }
        if !age_eligible(&key.create_time, cutoff) {
            debug!(resource.name = %key.name, "Tag key too young");
            report.record_skipped(ResourceKind::TagKey);
            continue;
        }
        delete_tag_key(tags, key, report).await;
    }
}

/// Delete all values of a key, then the key if nothing was left behind
async fn delete_tag_key(tags: &dyn TagManager, key: &TagKey, report: &mut RunReport) {
    let parent = key.name.as_str();
    let values = match collect_pages(|token| async move {
        tags.list_tag_values(parent, token.as_deref()).await
    })
    .await
    {
        Ok(values) => values,
        Err(e) => {
            warn!(resource.name = %key.name, error = %e, "Failed to list tag values");
            report.record_failure(ResourceKind::TagValue, &key.name, e);
            return;
        }
    };

    let mut values_left = 0;
    for value in &values {
        let result = tags.delete_tag_value(&value.name).await;
        match &result {
            Ok(()) => info!(resource.name = %value.name, short_name = %value.short_name, "Tag value deletion requested"),
            Err(e) => {
                warn!(resource.name = %value.name, error = %e, "Failed to delete tag value");
                values_left += 1;
            }
        }
        report.record_delete(ResourceKind::TagValue, &value.name, &result);
    }

    if values_left > 0 {
        warn!(resource.name = %key.name, values_left, "Tag key still has values, not deleting it");
        report.record_failure(
            ResourceKind::TagKey,
            &key.name,
            format!("{values_left} tag value(s) could not be deleted"),
        );
        return;
    }

    let result = tags.delete_tag_key(&key.name).await;
    match &result {
        Ok(()) => info!(resource.name = %key.name, short_name = %key.short_name, "Tag key deletion requested"),
        Err(e) => warn!(resource.name = %key.name, error = %e, "Failed to delete tag key"),
    }
    report.record_delete(ResourceKind::TagKey, &key.name, &result);
}

/// Delete notification configs pointing at projects that are being deleted
pub async fn sweep_security_notifications(
    config: &CleanupConfig,
    providers: &CloudProviders,
    report: &mut RunReport,
) {
    let Some(organization) = config.organization_name() else {
        warn!("SCC notification cleanup enabled without an organization, skipping");
        return;
    };
    let notifications = providers.security_notifications.as_ref();
    let parent = organization.as_str();
    let page_size = config.scc_notifications_page_size;

    let configs = match collect_pages(|token| async move {
        notifications
            .list_notification_configs(parent, page_size, token.as_deref())
            .await
    })
    .await
    {
        Ok(configs) => configs,
        Err(e) => {
            warn!(error = %e, "Failed to list SCC notification configs");
            report.record_failure(ResourceKind::SecurityNotification, parent, e);
            return;
        }
    };
    info!(count = configs.len(), "Listed SCC notification configs");

    for notification in &configs {
        let eligible = referencing_resource_eligible(
            providers.resource_manager.as_ref(),
            &notification.name,
            notification.pubsub_topic.as_deref(),
            &config.included_scc_notifications,
        )
        .await;
        if !eligible {
            report.record_skipped(ResourceKind::SecurityNotification);
            continue;
        }

        let result = notifications
            .delete_notification_config(&notification.name)
            .await;
        match &result {
            Ok(()) => info!(resource.name = %notification.name, "SCC notification config deleted"),
            Err(e) => warn!(resource.name = %notification.name, error = %e, "Failed to delete SCC notification config"),
        }
        report.record_delete(ResourceKind::SecurityNotification, &notification.name, &result);
    }
}

/// Delete asset feeds pointing at projects that are being deleted
pub async fn sweep_asset_feeds(
    config: &CleanupConfig,
    providers: &CloudProviders,
    report: &mut RunReport,
) {
    let Some(organization) = config.organization_name() else {
        warn!("CAI feed cleanup enabled without an organization, skipping");
        return;
    };
    let feeds = match providers.asset_feeds.list_feeds(&organization).await {
        Ok(feeds) => feeds,
        Err(e) => {
            warn!(error = %e, "Failed to list CAI feeds");
            report.record_failure(ResourceKind::AssetFeed, &organization, e);
            return;
        }
    };
    info!(count = feeds.len(), "Listed CAI feeds");

    for feed in &feeds {
        let eligible = referencing_resource_eligible(
            providers.resource_manager.as_ref(),
            &feed.name,
            feed.topic.as_deref(),
            &config.included_feeds,
        )
        .await;
        if !eligible {
            report.record_skipped(ResourceKind::AssetFeed);
            continue;
        }

        let result = providers.asset_feeds.delete_feed(&feed.name).await;
        match &result {
            Ok(()) => info!(resource.name = %feed.name, "CAI feed deleted"),
            Err(e) => warn!(resource.name = %feed.name, error = %e, "Failed to delete CAI feed"),
        }
        report.record_delete(ResourceKind::AssetFeed, &feed.name, &result);
    }
}

/// Name gate plus referenced-project gate shared by notifications and feeds
///
/// The short name must match an include pattern, the topic must name a
/// project, and that project must be `DELETE_REQUESTED`. Lookup failures make
/// the resource ineligible.
async fn referencing_resource_eligible(
    resource_manager: &dyn ResourceManager,
    name: &str,
    topic: Option<&str>,
    include: &[regex::Regex],
) -> bool {
    if !name_eligible(short_name(name), include) {
        debug!(resource.name = %name, "Name does not match any include pattern");
        return false;
    }
    let Some(project_id) = topic.and_then(project_from_topic) else {
        debug!(resource.name = %name, "No project referenced by topic");
        return false;
    };
    match resource_manager.get_project(project_id).await {
        Ok(project) if referenced_project_eligible(&project.lifecycle_state) => true,
        Ok(project) => {
            debug!(
                resource.name = %name,
                project.id = %project_id,
                lifecycle_state = %project.lifecycle_state,
                "Referenced project is not being deleted"
            );
            false
        }
        Err(e) => {
            warn!(resource.name = %name, project.id = %project_id, error = %e, "Failed to get referenced project");
            false
        }
    }
}

/// Delete old billing account sinks matching an include pattern
pub async fn sweep_billing_sinks(
    config: &CleanupConfig,
    providers: &CloudProviders,
    cutoff: DateTime<Utc>,
    report: &mut RunReport,
) {
    let Some(billing_account) = config.billing_account_name() else {
        warn!("Billing sink cleanup enabled without a billing account, skipping");
        return;
    };
    let billing_sinks = providers.billing_sinks.as_ref();
    let parent = billing_account.as_str();
    let page_size = config.billing_sinks_page_size;

    let sinks = match collect_pages(|token| async move {
        billing_sinks
            .list_sinks(parent, page_size, token.as_deref())
            .await
    })
    .await
    {
        Ok(sinks) => sinks,
        Err(e) => {
            warn!(error = %e, "Failed to list billing sinks");
            report.record_failure(ResourceKind::BillingSink, parent, e);
            return;
        }
    };
    info!(count = sinks.len(), "Listed billing sinks");

    for sink in &sinks {
        if RESERVED_SINK_NAMES.contains(&sink.name.as_str()) {
            debug!(resource.name = %sink.name, "Reserved sink");
            report.record_skipped(ResourceKind::BillingSink);
            continue;
        }
        if !age_eligible(&sink.create_time, cutoff)
            || !name_eligible(&sink.name, &config.included_billing_sinks)
        {
            debug!(resource.name = %sink.name, destination = %sink.destination, "Sink not eligible");
            report.record_skipped(ResourceKind::BillingSink);
            continue;
        }

        let result = billing_sinks.delete_sink(parent, &sink.name).await;
        match &result {
            Ok(()) => info!(resource.name = %sink.name, "Billing sink deleted"),
            Err(e) => warn!(resource.name = %sink.name, error = %e, "Failed to delete billing sink"),
        }
        report.record_delete(ResourceKind::BillingSink, &sink.name, &result);
    }
}
