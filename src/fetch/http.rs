//! HTTP client for remote directive targets

use bytes::Bytes;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, warn};

use super::FetchError;
use crate::config::FetchConfig;

/// Upper bound for the delay between two download attempts
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Total attempts per download (1 = no retry)
    pub max_retries: u32,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::from(&FetchConfig::default())
    }
}

impl From<&FetchConfig> for HttpConfig {
    fn from(config: &FetchConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout.as_duration(),
            request_timeout: config.request_timeout.as_duration(),
            max_retries: config.max_retries.max(1),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// HTTP downloader
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpConfig,
}

impl HttpClient {
    pub fn new(config: HttpConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Download a resource, retrying with exponential backoff
    pub async fn download(&self, url: &Url) -> Result<Bytes, FetchError> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.download_once(url).await {
                Ok(bytes) => {
                    if attempts > 1 {
                        debug!(%url, attempts, "Download succeeded after retry");
                    }
                    return Ok(bytes);
                }
                Err(e) if attempts >= self.config.max_retries || !e.is_retryable() => {
                    if attempts > 1 {
                        warn!(%url, attempts, error = %e, "Download failed after retries");
                    }
                    return Err(e);
                }
                Err(e) => {
                    warn!(%url, attempts, error = %e, "Download failed, retrying");

                    tokio::time::sleep(backoff(attempts)).await;
                }
            }
        }
    }

    /// Download once (no retry)
    async fn download_once(&self, url: &Url) -> Result<Bytes, FetchError> {
        debug!(%url, "Starting download");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(url.to_string())
            } else if e.is_redirect() {
                FetchError::TooManyRedirects(url.to_string())
            } else {
                FetchError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::RequestFailed(format!("Failed to read body: {}", e)))?;

        debug!(%url, size = bytes.len(), "Download completed");

        Ok(bytes)
    }
}

/// Exponential backoff after the given failed attempt: 1s, 2s, 4s ... capped at [`MAX_BACKOFF`]
fn backoff(attempt: u32) -> Duration {
    2u64.checked_pow(attempt.saturating_sub(1))
        .map(Duration::from_secs)
        .map_or(MAX_BACKOFF, |delay| delay.min(MAX_BACKOFF))
}
