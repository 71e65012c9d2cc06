// Remote box-score source: fetches the published sheet's CSV export.
//
// The trait is the seam the engine is tested through; production code uses
// `HttpSource` against the real sheet URL.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

// ---------------------------------------------------------------------------
// Source trait
// ---------------------------------------------------------------------------

/// Anything that can produce the raw box-score table as CSV text.
#[async_trait]
pub trait BoxScoreSource: Send + Sync {
    async fn fetch_csv(&self) -> Result<String, FetchError>;
}

// ---------------------------------------------------------------------------
// HttpSource
// ---------------------------------------------------------------------------

/// GETs the sheet export URL with an explicit per-request deadline, so a
/// stalled fetch fails instead of hanging the caller indefinitely.
pub struct HttpSource {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: String, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.source_url.clone(), config.fetch_timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl BoxScoreSource for HttpSource {
    async fn fetch_csv(&self) -> Result<String, FetchError> {
        let response = self
            .http
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: self.url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status,
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Request {
            url: self.url.clone(),
            source: e,
        })?;
        debug!(bytes = body.len(), "fetched box-score sheet");
        Ok(body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
