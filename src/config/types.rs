use serde::Deserialize;

/// Main configuration structure for Site-Digest
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

/// Engine-level settings
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Site crawled when the query names none
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// HTTP fetch settings
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Browser-like identification sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for exploratory crawl fetches (seconds)
    #[serde(rename = "crawl-timeout-secs", default = "default_crawl_timeout")]
    pub crawl_timeout_secs: u64,

    /// Timeout for a specifically requested page (seconds)
    #[serde(rename = "page-timeout-secs", default = "default_page_timeout")]
    pub page_timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            crawl_timeout_secs: default_crawl_timeout(),
            page_timeout_secs: default_page_timeout(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum link depth followed from the seed URL
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Discovery budget: pages visited and pages collected per crawl
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Pages kept per query after ranking
    #[serde(rename = "max-results", default = "default_max_results")]
    pub max_results: usize,

    /// Delay between consecutive fetches (milliseconds)
    #[serde(rename = "politeness-delay-ms", default = "default_politeness_delay")]
    pub politeness_delay_ms: u64,

    /// Worker cap for fetching an already-known candidate list
    #[serde(rename = "fetch-workers", default = "default_fetch_workers")]
    pub fetch_workers: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_pages: default_max_pages(),
            max_results: default_max_results(),
            politeness_delay_ms: default_politeness_delay(),
            fetch_workers: default_fetch_workers(),
        }
    }
}

/// Cache lifetimes
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// TTL for ad-hoc query results (seconds)
    #[serde(rename = "query-ttl-secs", default = "default_query_ttl")]
    pub query_ttl_secs: u64,

    /// TTL for whole-site snapshots (seconds)
    #[serde(rename = "site-ttl-secs", default = "default_site_ttl")]
    pub site_ttl_secs: u64,

    /// Interval of the background sweep (seconds)
    #[serde(rename = "sweep-interval-secs", default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Optional cap on entries per cache; oldest entries are evicted first
    #[serde(rename = "max-entries", default)]
    pub max_entries: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            query_ttl_secs: default_query_ttl(),
            site_ttl_secs: default_site_ttl(),
            sweep_interval_secs: default_sweep_interval(),
            max_entries: None,
        }
    }
}

/// Whole-site snapshot settings
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    /// Maximum pages kept in one snapshot
    #[serde(rename = "max-pages", default = "default_snapshot_pages")]
    pub max_pages: usize,

    /// Known pages fetched alongside the site root
    #[serde(default)]
    pub seeds: Vec<String>,

    /// Terms that pull matching links to the front of the snapshot crawl
    #[serde(rename = "priority-keywords", default = "default_priority_keywords")]
    pub priority_keywords: Vec<String>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            max_pages: default_snapshot_pages(),
            seeds: Vec::new(),
            priority_keywords: default_priority_keywords(),
        }
    }
}

fn default_base_url() -> String {
    "https://example.com".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_crawl_timeout() -> u64 {
    3
}

fn default_page_timeout() -> u64 {
    5
}

fn default_max_depth() -> u32 {
    2
}

fn default_max_pages() -> usize {
    10
}

fn default_max_results() -> usize {
    5
}

fn default_politeness_delay() -> u64 {
    100
}

fn default_fetch_workers() -> usize {
    3
}

fn default_query_ttl() -> u64 {
    15 * 60
}

fn default_site_ttl() -> u64 {
    4 * 60 * 60
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_snapshot_pages() -> usize {
    8
}

fn default_priority_keywords() -> Vec<String> {
    ["admission", "academic", "tuition", "fee", "contact", "about"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
