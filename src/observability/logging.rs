//! # Logging
//!
//! Tracing subscriber setup. Cloud Run and Cloud Functions ingest one JSON
//! object per line, so JSON is the default; `LOG_FORMAT=text` switches to the
//! human readable formatter for local runs.

use anyhow::Result;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "project_cleaner=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" | "" => Ok(Self::Json),
            "text" | "pretty" => Ok(Self::Text),
            other => Err(anyhow::anyhow!(
                "Unsupported LOG_FORMAT '{other}' (expected 'json' or 'text')"
            )),
        }
    }
}

impl LogFormat {
    /// Read `LOG_FORMAT`, defaulting to JSON
    ///
    /// # Errors
    /// Returns an error for unknown formats.
    pub fn from_env() -> Result<Self> {
        std::env::var("LOG_FORMAT").map_or(Ok(Self::Json), |value| value.parse())
    }
}

/// Install the global tracing subscriber
///
/// # Errors
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(format: LogFormat) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let result = match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_current_span(true)
            .with_env_filter(filter)
            .try_init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))
}
