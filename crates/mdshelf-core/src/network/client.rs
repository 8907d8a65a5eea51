//! HTTP client used for remote image downloads.
//!
//! A thin wrapper around reqwest with:
//! - A bounded per-request timeout
//! - A conservative User-Agent
//! - Non-2xx responses turned into `DownloadFailed`

use crate::config::NetworkConfig;
use crate::{MdShelfError, Result};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

/// HTTP client for image downloads.
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a client with the default fetch timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(NetworkConfig::FETCH_TIMEOUT)
    }

    /// Create a client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| MdShelfError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(e),
            })?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url`, failing on transport errors and non-2xx statuses.
    pub async fn get(&self, url: &str) -> Result<Response> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                MdShelfError::Timeout(self.timeout)
            } else {
                MdShelfError::DownloadFailed {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MdShelfError::DownloadFailed {
                url: url.to_string(),
                message: format!("HTTP status {}", status),
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_uses_fetch_timeout() {
        let client = HttpClient::new().unwrap();
        assert_eq!(client.timeout(), NetworkConfig::FETCH_TIMEOUT);
    }
}
