//! # Cleanup Configuration
//!
//! Sweep settings loaded once from environment variables.
//!
//! Construction is fallible: a missing or malformed required value yields a
//! [`ConfigError`] which the entry point turns into a non-zero exit before any
//! folder is visited.

use super::error::ConfigError;
use crate::constants::{
    DEFAULT_BILLING_SINKS_PAGE_SIZE, DEFAULT_ENDPOINT_SETTLE_DELAY_SECS,
    DEFAULT_RETRY_INITIAL_DELAY_SECS, DEFAULT_RETRY_MAX_ATTEMPTS,
    DEFAULT_SCC_NOTIFICATIONS_PAGE_SIZE,
};
use chrono::{DateTime, TimeDelta, Utc};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

pub const MAX_PROJECT_AGE_HOURS: &str = "MAX_PROJECT_AGE_HOURS";
pub const TARGET_FOLDER_ID: &str = "TARGET_FOLDER_ID";
pub const TARGET_ORGANIZATION_ID: &str = "TARGET_ORGANIZATION_ID";
pub const TARGET_EXCLUDED_LABELS: &str = "TARGET_EXCLUDED_LABELS";
pub const TARGET_INCLUDED_LABELS: &str = "TARGET_INCLUDED_LABELS";
pub const TARGET_EXCLUDED_TAGKEYS: &str = "TARGET_EXCLUDED_TAGKEYS";
pub const TARGET_INCLUDED_SCC_NOTIFICATIONS: &str = "TARGET_INCLUDED_SCC_NOTIFICATIONS";
pub const TARGET_INCLUDED_FEEDS: &str = "TARGET_INCLUDED_FEEDS";
pub const TARGET_BILLING_SINKS: &str = "TARGET_BILLING_SINKS";
pub const CLEAN_UP_TAG_KEYS: &str = "CLEAN_UP_TAG_KEYS";
pub const CLEAN_UP_SCC_NOTIFICATIONS: &str = "CLEAN_UP_SCC_NOTIFICATIONS";
pub const CLEAN_UP_CAI_FEEDS: &str = "CLEAN_UP_CAI_FEEDS";
pub const CLEAN_UP_BILLING_SINKS: &str = "CLEAN_UP_BILLING_SINKS";
pub const BILLING_ACCOUNT: &str = "BILLING_ACCOUNT";
pub const SCC_NOTIFICATIONS_PAGE_SIZE: &str = "SCC_NOTIFICATIONS_PAGE_SIZE";
pub const BILLING_SINKS_PAGE_SIZE: &str = "BILLING_SINKS_PAGE_SIZE";
pub const RETRY_MAX_ATTEMPTS: &str = "RETRY_MAX_ATTEMPTS";
pub const RETRY_INITIAL_DELAY_SECS: &str = "RETRY_INITIAL_DELAY_SECS";
pub const ENDPOINT_SETTLE_DELAY_SECS: &str = "ENDPOINT_SETTLE_DELAY_SECS";

static NUMERIC_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+$").expect("numeric id pattern is valid - this should never happen")
});

static BILLING_ACCOUNT_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9]{6}-[A-Z0-9]{6}-[A-Z0-9]{6}$")
        .expect("billing account pattern is valid - this should never happen")
});

/// Settings of one cleanup deployment
///
/// Immutable for the lifetime of the process. The age cutoff itself is derived
/// per run from [`CleanupConfig::cutoff_at`] so a long-running server keeps
/// moving its cutoff forward.
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// Projects, folders, tag keys and sinks younger than this are kept
    pub max_project_age_hours: i64,
    /// Numeric id of the folder the traversal starts from
    pub target_folder_id: String,
    /// Numeric id of the organization swept by the org-level passes
    pub target_organization_id: Option<String>,
    /// A project carrying any of these key/value pairs is never deleted
    pub excluded_labels: HashMap<String, String>,
    /// When non-empty, a project must carry at least one of these key/value pairs
    pub included_labels: HashMap<String, String>,
    /// Tag key short names that survive tag cleanup
    pub excluded_tag_keys: Vec<String>,
    /// Notification config names eligible for deletion
    pub included_scc_notifications: Vec<Regex>,
    /// Asset feed names eligible for deletion
    pub included_feeds: Vec<Regex>,
    /// Billing log sink names eligible for deletion
    pub included_billing_sinks: Vec<Regex>,
    pub clean_up_tag_keys: bool,
    pub clean_up_scc_notifications: bool,
    pub clean_up_cai_feeds: bool,
    pub clean_up_billing_sinks: bool,
    /// Billing account owning the sinks, `XXXXXX-XXXXXX-XXXXXX`
    pub billing_account: Option<String>,
    pub scc_notifications_page_size: u32,
    pub billing_sinks_page_size: u32,
    /// Attempt budget of the retry wrapper around project listing
    pub retry_max_attempts: u32,
    /// First sleep of the retry wrapper, doubled after each transient failure
    pub retry_initial_delay: Duration,
    /// Wait between service endpoint removal and the second project delete
    pub endpoint_settle_delay: Duration,
}

impl CleanupConfig {
    /// Minimal configuration for a folder sweep with every optional feature off
    pub fn new(target_folder_id: impl Into<String>, max_project_age_hours: i64) -> Self {
        Self {
            max_project_age_hours,
            target_folder_id: target_folder_id.into(),
            target_organization_id: None,
            excluded_labels: HashMap::new(),
            included_labels: HashMap::new(),
            excluded_tag_keys: Vec::new(),
            included_scc_notifications: Vec::new(),
            included_feeds: Vec::new(),
            included_billing_sinks: Vec::new(),
            clean_up_tag_keys: false,
            clean_up_scc_notifications: false,
            clean_up_cai_feeds: false,
            clean_up_billing_sinks: false,
            billing_account: None,
            scc_notifications_page_size: DEFAULT_SCC_NOTIFICATIONS_PAGE_SIZE,
            billing_sinks_page_size: DEFAULT_BILLING_SINKS_PAGE_SIZE,
            retry_max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            retry_initial_delay: Duration::from_secs(DEFAULT_RETRY_INITIAL_DELAY_SECS),
            endpoint_settle_delay: Duration::from_secs(DEFAULT_ENDPOINT_SETTLE_DELAY_SECS),
        }
    }

    /// Load configuration from the process environment
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] encountered.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] encountered.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| -> Option<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let max_age_raw = get(MAX_PROJECT_AGE_HOURS).ok_or(ConfigError::Missing {
            key: MAX_PROJECT_AGE_HOURS,
        })?;
        let max_project_age_hours = max_age_raw
            .parse::<i64>()
            .ok()
            .filter(|hours| *hours >= 0 && cutoff_before(Utc::now(), *hours).is_some())
            .ok_or(ConfigError::InvalidInteger {
                key: MAX_PROJECT_AGE_HOURS,
                value: max_age_raw,
            })?;

        let target_folder_id = numeric_id(TARGET_FOLDER_ID, get(TARGET_FOLDER_ID))?;

        let clean_up_tag_keys = parse_bool(CLEAN_UP_TAG_KEYS, get(CLEAN_UP_TAG_KEYS))?;
        let clean_up_scc_notifications =
            parse_bool(CLEAN_UP_SCC_NOTIFICATIONS, get(CLEAN_UP_SCC_NOTIFICATIONS))?;
        let clean_up_cai_feeds = parse_bool(CLEAN_UP_CAI_FEEDS, get(CLEAN_UP_CAI_FEEDS))?;
        let clean_up_billing_sinks =
            parse_bool(CLEAN_UP_BILLING_SINKS, get(CLEAN_UP_BILLING_SINKS))?;

        let target_organization_id = match get(TARGET_ORGANIZATION_ID) {
            Some(raw) => Some(numeric_id(TARGET_ORGANIZATION_ID, Some(raw))?),
            None if clean_up_tag_keys || clean_up_scc_notifications || clean_up_cai_feeds => {
                return Err(ConfigError::Missing {
                    key: TARGET_ORGANIZATION_ID,
                });
            }
            None => None,
        };

        let billing_account = match get(BILLING_ACCOUNT) {
            Some(raw) if BILLING_ACCOUNT_FORMAT.is_match(&raw) => Some(raw),
            Some(raw) => return Err(ConfigError::InvalidBillingAccount { value: raw }),
            None if clean_up_billing_sinks => {
                return Err(ConfigError::Missing {
                    key: BILLING_ACCOUNT,
                })
            }
            None => None,
        };

        Ok(Self {
            max_project_age_hours,
            target_folder_id,
            target_organization_id,
            excluded_labels: parse_json(TARGET_EXCLUDED_LABELS, get(TARGET_EXCLUDED_LABELS))?,
            included_labels: parse_json(TARGET_INCLUDED_LABELS, get(TARGET_INCLUDED_LABELS))?,
            excluded_tag_keys: parse_json(TARGET_EXCLUDED_TAGKEYS, get(TARGET_EXCLUDED_TAGKEYS))?,
            included_scc_notifications: parse_regex_list(
                TARGET_INCLUDED_SCC_NOTIFICATIONS,
                get(TARGET_INCLUDED_SCC_NOTIFICATIONS),
            )?,
            included_feeds: parse_regex_list(TARGET_INCLUDED_FEEDS, get(TARGET_INCLUDED_FEEDS))?,
            included_billing_sinks: parse_regex_list(
                TARGET_BILLING_SINKS,
                get(TARGET_BILLING_SINKS),
            )?,
            clean_up_tag_keys,
            clean_up_scc_notifications,
            clean_up_cai_feeds,
            clean_up_billing_sinks,
            billing_account,
            scc_notifications_page_size: positive_or_default(
                SCC_NOTIFICATIONS_PAGE_SIZE,
                get(SCC_NOTIFICATIONS_PAGE_SIZE),
                DEFAULT_SCC_NOTIFICATIONS_PAGE_SIZE,
            )?,
            billing_sinks_page_size: positive_or_default(
                BILLING_SINKS_PAGE_SIZE,
                get(BILLING_SINKS_PAGE_SIZE),
                DEFAULT_BILLING_SINKS_PAGE_SIZE,
            )?,
            retry_max_attempts: positive_or_default(
                RETRY_MAX_ATTEMPTS,
                get(RETRY_MAX_ATTEMPTS),
                DEFAULT_RETRY_MAX_ATTEMPTS,
            )?,
            retry_initial_delay: Duration::from_secs(u64_or_default(
                RETRY_INITIAL_DELAY_SECS,
                get(RETRY_INITIAL_DELAY_SECS),
                DEFAULT_RETRY_INITIAL_DELAY_SECS,
            )?),
            endpoint_settle_delay: Duration::from_secs(u64_or_default(
                ENDPOINT_SETTLE_DELAY_SECS,
                get(ENDPOINT_SETTLE_DELAY_SECS),
                DEFAULT_ENDPOINT_SETTLE_DELAY_SECS,
            )?),
        })
    }

    /// Resource name of the traversal root, `folders/<id>`
    pub fn root_folder_name(&self) -> String {
        format!("folders/{}", self.target_folder_id)
    }

    /// Resource name of the swept organization, `organizations/<id>`
    pub fn organization_name(&self) -> Option<String> {
        self.target_organization_id
            .as_ref()
            .map(|id| format!("organizations/{id}"))
    }

    /// Resource name of the billing account, `billingAccounts/<id>`
    pub fn billing_account_name(&self) -> Option<String> {
        self.billing_account
            .as_ref()
            .map(|id| format!("billingAccounts/{id}"))
    }

    /// Creation time before which a resource is a deletion candidate
    ///
    /// Saturates at the earliest representable instant; an age loaded through
    /// [`CleanupConfig::from_lookup`] never reaches it.
    pub fn cutoff_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        cutoff_before(now, self.max_project_age_hours).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether any organization-level pass is enabled
    pub fn org_sweeps_enabled(&self) -> bool {
        self.clean_up_tag_keys
            || self.clean_up_scc_notifications
            || self.clean_up_cai_feeds
            || self.clean_up_billing_sinks
    }
}

/// `now` minus `hours`, `None` when chrono cannot represent the result
fn cutoff_before(now: DateTime<Utc>, hours: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_hours(hours).and_then(|age| now.checked_sub_signed(age))
}

fn numeric_id(key: &'static str, raw: Option<String>) -> Result<String, ConfigError> {
    let value = raw.ok_or(ConfigError::Missing { key })?;
    if NUMERIC_ID.is_match(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidIdentifier { key, value })
    }
}

/// Parse a JSON-valued setting; absent means the type's empty value
fn parse_json<T>(key: &'static str, raw: Option<String>) -> Result<T, ConfigError>
where
    T: serde::de::DeserializeOwned + Default,
{
    match raw {
        Some(raw) => {
            serde_json::from_str(&raw).map_err(|source| ConfigError::InvalidJson { key, source })
        }
        None => Ok(T::default()),
    }
}

fn parse_regex_list(key: &'static str, raw: Option<String>) -> Result<Vec<Regex>, ConfigError> {
    let patterns: Vec<String> = parse_json(key, raw)?;
    patterns
        .into_iter()
        .map(|pattern| {
            Regex::new(&pattern).map_err(|source| ConfigError::InvalidRegex {
                key,
                pattern,
                source,
            })
        })
        .collect()
}

fn parse_bool(key: &'static str, raw: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = raw else {
        return Ok(false);
    };
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean { key, value }),
    }
}

fn positive_or_default(
    key: &'static str,
    raw: Option<String>,
    default: u32,
) -> Result<u32, ConfigError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.parse::<u32>() {
        Ok(0) => Err(ConfigError::NotPositive { key }),
        Ok(parsed) => Ok(parsed),
        Err(_) => Err(ConfigError::InvalidInteger { key, value }),
    }
}

fn u64_or_default(key: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.parse::<u64>() {
        Ok(parsed) => Ok(parsed),
        Err(_) => Err(ConfigError::InvalidInteger { key, value }),
    }
}
