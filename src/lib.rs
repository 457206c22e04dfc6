//! Site-Digest: on-demand web content retrieval
//!
//! This crate takes a natural-language query, crawls a bounded neighborhood of
//! the site the query names (or a configured default site), extracts
//! structured content from each page, scores it against the query, caches the
//! result and renders a deduplicated text digest for a language model prompt.

pub mod cache;
pub mod config;
pub mod crawler;
pub mod digest;
pub mod engine;
pub mod query;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Digest operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// A single page fetch that did not produce a usable body
///
/// Every variant is non-fatal to a crawl: the offending URL is skipped.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Unsupported content type '{content_type}' for {url}")]
    ContentMismatch { url: String, content_type: String },
}

impl FetchError {
    /// The URL the failed request was made to
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url }
            | Self::HttpStatus { url, .. }
            | Self::Network { url, .. }
            | Self::ContentMismatch { url, .. } => url,
        }
    }
}

/// Markup that could not be turned into an extracted page
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid source URL '{url}': {message}")]
    InvalidSourceUrl { url: String, message: String },

    #[error("Empty document for {url}")]
    EmptyDocument { url: String },

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Site-Digest operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use cache::TtlCache;
pub use config::Config;
pub use crawler::{Crawler, ExtractedPage, Fetcher};
pub use digest::{Digest, DigestFormatter};
pub use engine::{RetrievalEngine, RetrievedContext};
pub use query::{extract_target, QueryIntent};
