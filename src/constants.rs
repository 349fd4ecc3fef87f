//! # Constants
//!
//! Shared constants used throughout the cleaner.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Default HTTP server port for the Pub/Sub push endpoint, metrics and probes
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default number of attempts the retry wrapper makes around project listing
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 5;

/// Default first backoff delay of the retry wrapper (seconds)
/// Doubles after every retryable failure
pub const DEFAULT_RETRY_INITIAL_DELAY_SECS: u64 = 60;

/// Default wait after service endpoint cleanup before the second project delete (seconds)
pub const DEFAULT_ENDPOINT_SETTLE_DELAY_SECS: u64 = 10;

/// Default page size for Security Command Center notification listing
pub const DEFAULT_SCC_NOTIFICATIONS_PAGE_SIZE: u32 = 50;

/// Default page size for billing account log sink listing
pub const DEFAULT_BILLING_SINKS_PAGE_SIZE: u32 = 50;

/// Lifecycle state of a project that may be cleaned up
pub const LIFECYCLE_STATE_ACTIVE: &str = "ACTIVE";

/// Lifecycle state of a project whose deletion was already requested
pub const LIFECYCLE_STATE_DELETE_REQUESTED: &str = "DELETE_REQUESTED";

/// Log sinks every billing account owns; they can never be deleted
pub const RESERVED_SINK_NAMES: [&str; 2] = ["_Default", "_Required"];

/// HTTP status codes the retry wrapper treats as transient
pub const TRANSIENT_STATUS_CODES: [u16; 4] = [429, 500, 502, 503];

/// Number of service endpoints a project may keep without them blocking deletion
pub const NON_BLOCKING_ENDPOINT_COUNT: usize = 1;
