//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the engine:
//! - Building the HTTP client with a browser-like user agent
//! - Single GET requests with a per-request timeout
//! - Error classification into [`FetchError`]
//!
//! There is no retry or backoff; a failed fetch is reported once and the
//! caller decides what to skip.

use crate::config::FetcherConfig;
use crate::FetchError;
use reqwest::Client;
use std::time::Duration;

/// Connection establishment is bounded separately from the whole request
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Fetches raw page bodies over HTTP
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    crawl_timeout: Duration,
    page_timeout: Duration,
}

impl Fetcher {
    /// Builds a fetcher from configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use site_digest::config::FetcherConfig;
    /// use site_digest::crawler::Fetcher;
    ///
    /// let fetcher = Fetcher::new(&FetcherConfig::default()).unwrap();
    /// ```
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            crawl_timeout: Duration::from_secs(config.crawl_timeout_secs),
            page_timeout: Duration::from_secs(config.page_timeout_secs),
        })
    }

    /// Timeout used for exploratory crawl steps
    pub fn crawl_timeout(&self) -> Duration {
        self.crawl_timeout
    }

    /// Timeout used for a specifically requested page
    pub fn page_timeout(&self) -> Duration {
        self.page_timeout
    }

    /// Performs one GET request and returns the response body
    ///
    /// # Request Flow
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx/3xx with textual or missing Content-Type | `Ok(body)` |
    /// | HTTP status >= 400 | `FetchError::HttpStatus` |
    /// | Non-textual Content-Type | `FetchError::ContentMismatch` |
    /// | Timeout | `FetchError::Timeout` |
    /// | Connection or body read failure | `FetchError::Network` |
    pub async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        tracing::trace!("GET {} (timeout {:?})", url, timeout);

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_textual(&content_type) {
            return Err(FetchError::ContentMismatch {
                url: url.to_string(),
                content_type,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(url, e))?;

        Ok(body.to_vec())
    }
}

/// Builds an HTTP client with the configured user agent
///
/// Redirects follow reqwest's default policy (at most 10 hops).
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(CONNECT_TIMEOUT)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Accepts HTML, XML and plain text; an absent Content-Type is given the benefit of the doubt
fn is_textual(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.is_empty()
        || content_type.contains("html")
        || content_type.contains("xml")
        || content_type.starts_with("text/")
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
