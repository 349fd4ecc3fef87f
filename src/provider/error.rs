//! # Provider Errors
//!
//! Failures returned by every capability trait. The HTTP status is kept so the
//! retry wrapper can tell transient failures from permanent ones.

use crate::constants::TRANSIENT_STATUS_CODES;
use thiserror::Error;

/// Result alias used by all provider traits
pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API answered with a non-success status
    #[error("{service} API error (HTTP {status}): {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// The request never produced a response
    #[error("request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The response body did not match the expected schema
    #[error("failed to decode {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    /// No access token could be obtained
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The retry wrapper gave up; carries the last underlying failure
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<ProviderError>,
    },
}

impl ProviderError {
    /// Shorthand for an API error
    pub fn api(service: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            service,
            status,
            message: message.into(),
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure is a rate limit or a server-side hiccup worth retrying
    ///
    /// Only 429, 500, 502 and 503 qualify. Exhausted retries are never
    /// transient again.
    pub fn is_transient(&self) -> bool {
        self.status()
            .is_some_and(|status| TRANSIENT_STATUS_CODES.contains(&status))
    }

    /// Whether the resource was already gone
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        for status in [429, 500, 502, 503] {
            assert!(ProviderError::api("test", status, "boom").is_transient());
        }
        for status in [400, 403, 404, 409, 504] {
            assert!(!ProviderError::api("test", status, "boom").is_transient());
        }
        assert!(!ProviderError::Auth("no token".into()).is_transient());
    }

    #[test]
    fn test_exhausted_is_not_transient() {
        let err = ProviderError::RetriesExhausted {
            attempts: 5,
            last: Box::new(ProviderError::api("test", 503, "unavailable")),
        };
        assert!(!err.is_transient());
        assert!(err.to_string().contains("retries exhausted after 5 attempts"));
    }
}
