//! GCP REST Client
//!
//! Shared HTTP plumbing for every Google Cloud API the cleaner calls.
//! Uses reqwest for HTTP requests and an OAuth2 bearer token for authentication.
//!
//! The per-service trait implementations live next to this module and only
//! build URLs and decode payloads; request signing, error mapping and metrics
//! happen here.

use super::responses::{GcpErrorResponse, TokenResponse};
use crate::observability::metrics;
use crate::provider::{ProviderError, ProviderResult};
use anyhow::Context;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Refresh the cached token this long before it expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Base URLs of the Google Cloud APIs
///
/// Defaults point at the public endpoints. In Pact mode each one can be
/// redirected to a mock server through `GCP_<SERVICE>_ENDPOINT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcpEndpoints {
    pub resource_manager: String,
    pub compute: String,
    pub container: String,
    pub service_management: String,
    pub cloud_asset: String,
    pub security_center: String,
    pub logging: String,
}

impl Default for GcpEndpoints {
    fn default() -> Self {
        Self {
            resource_manager: "https://cloudresourcemanager.googleapis.com".to_string(),
            compute: "https://compute.googleapis.com".to_string(),
            container: "https://container.googleapis.com".to_string(),
            service_management: "https://servicemanagement.googleapis.com".to_string(),
            cloud_asset: "https://cloudasset.googleapis.com".to_string(),
            security_center: "https://securitycenter.googleapis.com".to_string(),
            logging: "https://logging.googleapis.com".to_string(),
        }
    }
}

impl GcpEndpoints {
    /// Every API served from one base URL (mock servers)
    pub fn uniform(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            resource_manager: base.clone(),
            compute: base.clone(),
            container: base.clone(),
            service_management: base.clone(),
            cloud_asset: base.clone(),
            security_center: base.clone(),
            logging: base,
        }
    }

    /// Public endpoints, or per-service overrides when `PACT_MODE` is set
    pub fn from_env() -> Self {
        let defaults = Self::default();
        if std::env::var("PACT_MODE").is_err() {
            return defaults;
        }
        let pick = |key: &str, default: String| std::env::var(key).unwrap_or(default);
        Self {
            resource_manager: pick("GCP_RESOURCE_MANAGER_ENDPOINT", defaults.resource_manager),
            compute: pick("GCP_COMPUTE_ENDPOINT", defaults.compute),
            container: pick("GCP_CONTAINER_ENDPOINT", defaults.container),
            service_management: pick(
                "GCP_SERVICE_MANAGEMENT_ENDPOINT",
                defaults.service_management,
            ),
            cloud_asset: pick("GCP_CLOUD_ASSET_ENDPOINT", defaults.cloud_asset),
            security_center: pick("GCP_SECURITY_CENTER_ENDPOINT", defaults.security_center),
            logging: pick("GCP_LOGGING_ENDPOINT", defaults.logging),
        }
    }
}

/// Where bearer tokens come from
enum TokenSource {
    /// Fixed token (Pact mode, tests)
    Static(String),
    /// Metadata server token, cached until shortly before expiry
    Metadata(Mutex<Option<CachedToken>>),
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// GCP REST client shared by all capability implementations
pub struct GcpClient {
    http_client: Client,
    endpoints: GcpEndpoints,
    token_source: TokenSource,
}

impl std::fmt::Debug for GcpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcpClient")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl GcpClient {
    /// Create a client authenticated through the metadata server
    ///
    /// When `PACT_MODE` is set a dummy token is used and endpoints may be
    /// redirected to mock servers.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built or no token can be
    /// retrieved.
    pub async fn new() -> anyhow::Result<Self> {
        let endpoints = GcpEndpoints::from_env();
        if std::env::var("PACT_MODE").is_ok() {
            info!("Pact mode enabled: using endpoints {:?}", endpoints);
            return Self::with_token(endpoints, "test-token")
                .context("Failed to create GCP client in Pact mode");
        }

        let client = Self {
            http_client: build_http_client().context("Failed to create HTTP client")?,
            endpoints,
            token_source: TokenSource::Metadata(Mutex::new(None)),
        };

        // Fail at startup rather than on the first API call
        client
            .access_token()
            .await
            .context("Failed to get initial access token")?;
        Ok(client)
    }

    /// Create a client with a fixed bearer token
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_token(
        endpoints: GcpEndpoints,
        access_token: impl Into<String>,
    ) -> ProviderResult<Self> {
        Ok(Self {
            http_client: build_http_client()?,
            endpoints,
            token_source: TokenSource::Static(access_token.into()),
        })
    }

    pub fn endpoints(&self) -> &GcpEndpoints {
        &self.endpoints
    }

    /// Current bearer token, refreshed from the metadata server when needed
    async fn access_token(&self) -> ProviderResult<String> {
        match &self.token_source {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Metadata(cache) => {
                let mut cached = cache.lock().await;
                if let Some(token) = cached.as_ref() {
                    if token.expires_at > Instant::now() + TOKEN_EXPIRY_MARGIN {
                        return Ok(token.value.clone());
                    }
                }
                let fresh = self.fetch_metadata_token().await?;
                let value = fresh.value.clone();
                *cached = Some(fresh);
                Ok(value)
            }
        }
    }

    /// Get an OAuth2 access token from the GCE/GKE/Cloud Run metadata server
    async fn fetch_metadata_token(&self) -> ProviderResult<CachedToken> {
        let response = self
            .http_client
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| ProviderError::Auth(format!("metadata server not available: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!("Metadata server returned status {}: {}", status, body);
            if let Ok(credentials_path) = std::env::var("GOOGLE_APPLICATION_CREDENTIALS") {
                warn!(
                    "Service account JSON authentication is not supported. \
                    GOOGLE_APPLICATION_CREDENTIALS={} is set but will be ignored.",
                    credentials_path
                );
            }
            return Err(ProviderError::Auth(format!(
                "metadata server returned HTTP {status}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Auth(format!("invalid token response: {e}")))?;
        info!("Retrieved access token from metadata server");
        Ok(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }

    /// Build an authenticated request
    async fn request(&self, method: Method, url: &str) -> ProviderResult<RequestBuilder> {
        let token = self.access_token().await?;
        Ok(self
            .http_client
            .request(method, url)
            .bearer_auth(token)
            .header("Content-Type", "application/json"))
    }

    /// Send a request and map non-success statuses to [`ProviderError::Api`]
    async fn send(
        &self,
        service: &'static str,
        request: RequestBuilder,
    ) -> ProviderResult<reqwest::Response> {
        let start = Instant::now();
        let result = request.send().await;
        metrics::record_api_request(service, start.elapsed().as_secs_f64());

        let response = result.map_err(|source| {
            metrics::increment_api_errors(service);
            ProviderError::Transport { service, source }
        })?;

        if response.status().is_success() {
            return Ok(response);
        }

        metrics::increment_api_errors(service);
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        Err(handle_error_response(service, status, &error_text))
    }

    /// GET a JSON document
    pub(super) async fn get_json<T: DeserializeOwned>(
        &self,
        service: &'static str,
        url: &str,
        query: &[(&str, String)],
    ) -> ProviderResult<T> {
        debug!(service, url, "GET");
        let request = self.request(Method::GET, url).await?.query(query);
        let response = self.send(service, request).await?;
        response.json::<T>().await.map_err(|e| ProviderError::Decode {
            service,
            message: e.to_string(),
        })
    }

    /// DELETE a resource; the returned long-running operation is not awaited
    pub(super) async fn delete(&self, service: &'static str, url: &str) -> ProviderResult<()> {
        debug!(service, url, "DELETE");
        let request = self.request(Method::DELETE, url).await?;
        self.send(service, request).await.map(|_| ())
    }

    /// POST with query parameters and no body
    pub(super) async fn post_empty(
        &self,
        service: &'static str,
        url: &str,
        query: &[(&str, String)],
    ) -> ProviderResult<()> {
        debug!(service, url, "POST");
        let request = self.request(Method::POST, url).await?.query(query);
        self.send(service, request).await.map(|_| ())
    }
}

fn build_http_client() -> ProviderResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .map_err(|source| ProviderError::Transport {
            service: "http-client",
            source,
        })
}

/// Turn a GCP error payload into a [`ProviderError`]
///
/// GCP returns `{"error": {"code", "message", "status"}}`; anything else is
/// kept verbatim.
fn handle_error_response(
    service: &'static str,
    status: reqwest::StatusCode,
    error_text: &str,
) -> ProviderError {
    match serde_json::from_str::<GcpErrorResponse>(error_text) {
        Ok(error_response) => ProviderError::api(
            service,
            status.as_u16(),
            format!(
                "{} (status: {})",
                error_response.error.message, error_response.error.status
            ),
        ),
        Err(_) => ProviderError::api(service, status.as_u16(), error_text),
    }
}

/// Append `pageToken` to a query when a token is present
pub(super) fn with_page_token(
    mut query: Vec<(&'static str, String)>,
    page_token: Option<&str>,
) -> Vec<(&'static str, String)> {
    if let Some(token) = page_token {
        query.push(("pageToken", token.to_string()));
    }
    query
}
