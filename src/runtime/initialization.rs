//! # Initialization
//!
//! Process initialization shared by both commands: rustls setup, tracing,
//! build info, metrics, configuration and cloud clients.

use crate::cleanup::Cleaner;
use crate::config::CleanupConfig;
use crate::observability::{self, logging::LogFormat};
use crate::provider::gcp::GcpClient;
use crate::provider::CloudProviders;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Install the process-wide rustls crypto provider
///
/// Must run before any TLS connection is opened. Installing twice is harmless.
pub fn install_crypto_provider() {
    // Err only means a provider is already installed
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Initialize everything a sweep needs and return a ready [`Cleaner`]
///
/// Configuration errors surface here, before any cloud call is made.
///
/// # Errors
/// Returns an error if logging, metrics, configuration or the GCP client
/// cannot be initialized.
pub async fn initialize() -> Result<Cleaner> {
    install_crypto_provider();

    // A missing .env file is the normal case outside local development
    let dotenv_path = dotenvy::dotenv().ok();

    let log_format = LogFormat::from_env().context("Invalid LOG_FORMAT")?;
    observability::logging::init_logging(log_format)?;

    info!("Starting Project Cleaner");
    info!(
        "Build info: timestamp={}, datetime={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );
    if let Some(path) = dotenv_path {
        info!("Loaded environment from {}", path.display());
    }

    observability::metrics::register_metrics()?;

    let config = CleanupConfig::from_env().context("Invalid cleanup configuration")?;
    info!(
        target_folder = %config.target_folder_id,
        max_project_age_hours = config.max_project_age_hours,
        clean_up_tag_keys = config.clean_up_tag_keys,
        clean_up_scc_notifications = config.clean_up_scc_notifications,
        clean_up_cai_feeds = config.clean_up_cai_feeds,
        clean_up_billing_sinks = config.clean_up_billing_sinks,
        "Configuration loaded"
    );

    let client = GcpClient::new()
        .await
        .context("Failed to create GCP client")?;
    let providers = CloudProviders::uniform(Arc::new(client));

    Ok(Cleaner::new(Arc::new(config), providers))
}
