//! # Predicates
//!
//! Side-effect free eligibility checks. Each takes one resource snapshot plus
//! configuration and answers whether the resource may be deleted.

use crate::config::CleanupConfig;
use crate::constants::{LIFECYCLE_STATE_ACTIVE, LIFECYCLE_STATE_DELETE_REQUESTED};
use crate::provider::{Folder, Project};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::HashMap;
use tracing::warn;

/// Whether `created_at` is a valid RFC 3339 timestamp strictly before `cutoff`
///
/// Unparsable timestamps are never eligible.
pub fn age_eligible(created_at: &str, cutoff: DateTime<Utc>) -> bool {
    match DateTime::parse_from_rfc3339(created_at) {
        Ok(created) => created.with_timezone(&Utc) < cutoff,
        Err(e) => {
            warn!(
                create_time = created_at,
                error = %e,
                "Failed to parse creation time, skipping resource"
            );
            false
        }
    }
}

/// Include/exclude label check
///
/// Eligible iff (`include` is empty or at least one pair matches) and
/// (`exclude` is empty or no pair matches).
pub fn label_eligible(
    labels: &HashMap<String, String>,
    include: &HashMap<String, String>,
    exclude: &HashMap<String, String>,
) -> bool {
    let any_pair_matches = |wanted: &HashMap<String, String>| {
        wanted
            .iter()
            .any(|(key, value)| labels.get(key) == Some(value))
    };
    (include.is_empty() || any_pair_matches(include)) && !any_pair_matches(exclude)
}

/// Whether at least one pattern matches `name`; an empty list matches nothing
pub fn name_eligible(name: &str, include: &[Regex]) -> bool {
    include.iter().any(|pattern| pattern.is_match(name))
}

/// Only active projects are torn down
pub fn lifecycle_eligible(state: &str) -> bool {
    state == LIFECYCLE_STATE_ACTIVE
}

/// Organization-level resources go only once their project is being deleted
pub fn referenced_project_eligible(state: &str) -> bool {
    state == LIFECYCLE_STATE_DELETE_REQUESTED
}

/// Combined project filter: lifecycle, age, label include and label exclude
pub fn project_eligible(project: &Project, config: &CleanupConfig, cutoff: DateTime<Utc>) -> bool {
    lifecycle_eligible(&project.lifecycle_state)
        && age_eligible(&project.create_time, cutoff)
        && label_eligible(
            &project.labels,
            &config.included_labels,
            &config.excluded_labels,
        )
}

/// Folder guard: never the root, never the root's parent, and old enough
pub fn folder_eligible(
    folder: &Folder,
    root_name: &str,
    root_parent: Option<&str>,
    cutoff: DateTime<Utc>,
) -> bool {
    folder.name != root_name
        && root_parent != Some(folder.name.as_str())
        && age_eligible(&folder.create_time, cutoff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn rfc3339(time: DateTime<Utc>) -> String {
        time.to_rfc3339()
    }

    #[test]
    fn test_age_eligible_is_strict() {
        let cutoff = Utc::now();
        assert!(age_eligible(&rfc3339(cutoff - Duration::hours(1)), cutoff));
        assert!(!age_eligible(&rfc3339(cutoff), cutoff));
        assert!(!age_eligible(&rfc3339(cutoff + Duration::hours(1)), cutoff));
    }

    #[test]
    fn test_age_eligible_rejects_garbage() {
        assert!(!age_eligible("yesterday", Utc::now()));
        assert!(!age_eligible("", Utc::now()));
    }

    #[test]
    fn test_label_eligible_empty_maps_include_everything() {
        assert!(label_eligible(&labels(&[]), &labels(&[]), &labels(&[])));
        assert!(label_eligible(&labels(&[("env", "ci")]), &labels(&[]), &labels(&[])));
    }

    #[test]
    fn test_label_eligible_exclude_wins() {
        let project = labels(&[("env", "prod"), ("team", "ci")]);
        assert!(!label_eligible(
            &project,
            &labels(&[("team", "ci")]),
            &labels(&[("env", "prod")])
        ));
    }

    #[test]
    fn test_label_eligible_include_needs_one_matching_pair() {
        let include = labels(&[("env", "ci"), ("owner", "bot")]);
        assert!(label_eligible(&labels(&[("owner", "bot")]), &include, &labels(&[])));
        // Key present with a different value does not count
        assert!(!label_eligible(&labels(&[("env", "prod")]), &include, &labels(&[])));
        assert!(!label_eligible(&labels(&[]), &include, &labels(&[])));
    }

    #[test]
    fn test_name_eligible_requires_explicit_include() {
        let patterns = vec![Regex::new("^ci-").unwrap(), Regex::new("-tmp$").unwrap()];
        assert!(name_eligible("ci-feed", &patterns));
        assert!(name_eligible("build-tmp", &patterns));
        assert!(!name_eligible("prod-feed", &patterns));
        assert!(!name_eligible("ci-feed", &[]));
    }

    #[test]
    fn test_lifecycle_states() {
        assert!(lifecycle_eligible("ACTIVE"));
        assert!(!lifecycle_eligible("DELETE_REQUESTED"));
        assert!(referenced_project_eligible("DELETE_REQUESTED"));
        assert!(!referenced_project_eligible("ACTIVE"));
    }

    #[test]
    fn test_project_eligible_needs_all_four() {
        let cutoff = Utc::now() - Duration::hours(24);
        let mut config = CleanupConfig::new("100", 24);
        config.excluded_labels = labels(&[("env", "prod")]);

        let mut project = Project {
            project_id: "p1".into(),
            lifecycle_state: "ACTIVE".into(),
            labels: HashMap::new(),
            create_time: rfc3339(Utc::now() - Duration::hours(40)),
        };
        assert!(project_eligible(&project, &config, cutoff));

        project.labels = labels(&[("env", "prod")]);
        assert!(!project_eligible(&project, &config, cutoff));

        project.labels.clear();
        project.lifecycle_state = "DELETE_REQUESTED".into();
        assert!(!project_eligible(&project, &config, cutoff));

        project.lifecycle_state = "ACTIVE".into();
        project.create_time = rfc3339(Utc::now() - Duration::hours(5));
        assert!(!project_eligible(&project, &config, cutoff));
    }

    #[test]
    fn test_folder_guard_protects_root_and_its_parent() {
        let cutoff = Utc::now();
        let old = rfc3339(cutoff - Duration::hours(100));
        let folder = |name: &str| Folder {
            name: name.into(),
            parent: "folders/1".into(),
            display_name: name.into(),
            create_time: old.clone(),
        };

        assert!(!folder_eligible(&folder("folders/10"), "folders/10", Some("folders/1"), cutoff));
        assert!(!folder_eligible(&folder("folders/1"), "folders/10", Some("folders/1"), cutoff));
        assert!(folder_eligible(&folder("folders/11"), "folders/10", Some("folders/1"), cutoff));
        assert!(folder_eligible(&folder("folders/11"), "folders/10", None, cutoff));
    }
}
