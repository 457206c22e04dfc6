//! In-memory caching of retrieval results
//!
//! The engine keeps two independent instances of [`TtlCache`]: a short-lived
//! one for per-query results and a long-lived one for whole-site snapshots.

mod ttl;

pub use ttl::{CacheStats, TtlCache};

/// Builds the cache key for a site and query
///
/// # Example
///
/// ```
/// use site_digest::cache::cache_key;
///
/// assert_eq!(cache_key("https://example.com", "tuition"), "https://example.com:tuition");
/// ```
pub fn cache_key(base_url: &str, query: &str) -> String {
    format!("{}:{}", base_url, query)
}
