//! HTTP transport used by the tracker.

use crate::error::{EmsTrackerError, Result};
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Sends one GET request and hands back the response body.
///
/// Implementations report every failure (connection, timeout, non-2xx
/// status, unreadable body) as [`EmsTrackerError::Track`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<String>;
}

/// Configuration for the default HTTP transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// User agent string for HTTP requests
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: 30,
        }
    }
}

/// [`HttpTransport`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| EmsTrackerError::track(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    /// Wrap an already configured client
    pub fn from_client(http_client: Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<String> {
        let url = Url::parse(url)
            .map_err(|e| EmsTrackerError::track(format!("Invalid URL \"{}\": {}", url, e)))?;

        debug!("Making request to: {}", url);

        let mut request = self.http_client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                warn!("HTTP request failed: {}", e);
                EmsTrackerError::track(e.to_string())
            })?;

        response
            .text()
            .await
            .map_err(|e| EmsTrackerError::track(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TransportConfig::default();
        assert_eq!(config.timeout_seconds, 30);
        assert!(config.user_agent.contains("ems-tracker-rs"));
    }

    #[test]
    fn test_transport_creation() {
        assert!(ReqwestTransport::new(&TransportConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_url_is_track_failure() {
        let transport = ReqwestTransport::new(&TransportConfig::default()).unwrap();
        let err = transport.get("not a url", &[]).await.unwrap_err();
        assert!(err.is_track_failure());
        assert!(err.message().contains("not a url"));
    }
}
