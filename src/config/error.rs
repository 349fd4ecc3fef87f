//! # Configuration Errors

use thiserror::Error;

/// Reasons the cleaner refuses to start
///
/// Every variant names the offending environment key so the operator can fix
/// the deployment without reading code.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required setting {key} is not set")]
    Missing { key: &'static str },

    #[error("could not convert [{value}] to integer for {key}")]
    InvalidInteger { key: &'static str, value: String },

    #[error("{key} must be greater than zero")]
    NotPositive { key: &'static str },

    #[error("invalid numeric identifier [{value}] for {key}")]
    InvalidIdentifier { key: &'static str, value: String },

    #[error("{key} is not valid JSON of the expected shape: {source}")]
    InvalidJson {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{key} contains an invalid regular expression [{pattern}]: {source}")]
    InvalidRegex {
        key: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("could not convert [{value}] to boolean for {key}")]
    InvalidBoolean { key: &'static str, value: String },

    #[error("invalid billing account [{value}], expected format XXXXXX-XXXXXX-XXXXXX")]
    InvalidBillingAccount { value: String },
}
