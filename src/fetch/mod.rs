//! Content fetching for directive targets
//!
//! A target is either an `http://`/`https://` URL, fetched through the
//! [`AdmissionGate`] and the [`HttpClient`], or a path resolved against the
//! directory of the document that contains the directive.

mod gate;
pub mod http;

pub use gate::{Admission, AdmissionGate};
pub use http::{HttpClient, HttpConfig};

use bytes::Bytes;
use reqwest::Url;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::config::FetchConfig;
use crate::observability::Metrics;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("request to {0} timed out")]
    Timeout(String),

    #[error("too many redirects for {0}")]
    TooManyRedirects(String),

    #[error("GET {url}: HTTP {status} {reason}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("open {}: {reason}", path.display())]
    NotFound { path: PathBuf, reason: String },
}

impl FetchError {
    /// Transport-level failures and server errors may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::RequestFailed(_) | FetchError::Timeout(_) => true,
            FetchError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Returns true for targets fetched over HTTP.
pub fn is_remote(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}

/// Resolve a local target relative to the directory containing `relative_to`.
pub fn local_path(target: &str, relative_to: &Path) -> PathBuf {
    relative_to
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(target)
}

/// Fetches raw bytes for directive targets
#[derive(Debug, Clone)]
pub struct ContentFetcher {
    http: HttpClient,
    gate: AdmissionGate,
    metrics: Arc<Metrics>,
}

impl ContentFetcher {
    pub fn new(config: &FetchConfig, metrics: Arc<Metrics>) -> Result<Self, FetchError> {
        let http = HttpClient::new(HttpConfig::from(config))?;
        let gate = AdmissionGate::new(config.max_concurrent, config.min_interval.as_duration());

        Ok(Self::with_parts(http, gate, metrics))
    }

    pub fn with_parts(http: HttpClient, gate: AdmissionGate, metrics: Arc<Metrics>) -> Self {
        Self {
            http,
            gate,
            metrics,
        }
    }

    /// Fetch `target`; local paths are resolved relative to `relative_to`.
    pub async fn fetch(&self, target: &str, relative_to: &Path) -> Result<Bytes, FetchError> {
        if is_remote(target) {
            self.fetch_remote(target).await
        } else {
            self.fetch_local(&local_path(target, relative_to)).await
        }
    }

    async fn fetch_remote(&self, target: &str) -> Result<Bytes, FetchError> {
        let url = Url::parse(target).map_err(|e| FetchError::InvalidUrl {
            url: target.to_string(),
            reason: e.to_string(),
        })?;
        if url.host_str().is_none() {
            return Err(FetchError::InvalidUrl {
                url: target.to_string(),
                reason: "missing host".to_string(),
            });
        }

        let _admission = self.gate.admit().await?;
        self.metrics.remote_fetch();

        self.http.download(&url).await
    }

    async fn fetch_local(&self, path: &Path) -> Result<Bytes, FetchError> {
        debug!(path = %path.display(), "Reading local target");
        self.metrics.local_fetch();

        tokio::fs::read(path)
            .await
            .map(Bytes::from)
            .map_err(|e| FetchError::NotFound {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}
