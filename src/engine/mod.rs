//! Retrieval orchestration
//!
//! [`RetrievalEngine`] is the entry point collaborators call with a raw user
//! query. It resolves the target site, consults the query cache, crawls on a
//! miss and renders the digest handed back as prompt context.

mod snapshot;

pub use snapshot::{categorize, Category, SiteSnapshot, SnapshotEntry};

use crate::cache::{cache_key, CacheStats, TtlCache};
use crate::config::{validate, Config};
use crate::crawler::{rank_pages, Crawler, ExtractedPage, Fetcher};
use crate::digest::{Digest, DigestFormatter};
use crate::query::{extract_target, normalize_query, QueryIntent};
use crate::url::{is_same_site, normalize_url, site_root};
use crate::Result;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinHandle;
use url::Url;

/// Everything produced for one query
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedContext {
    /// Root of the site that was searched, e.g. `https://example.edu`
    pub site: String,
    /// The query with any target URL removed
    pub cleaned_query: String,
    /// The query actually used for crawling and scoring
    pub scraping_query: String,
    pub intent: QueryIntent,
    pub digest: Digest,
    pub from_cache: bool,
}

impl RetrievedContext {
    /// Text inserted verbatim into the downstream prompt
    ///
    /// When nothing could be retrieved the digest is replaced by a short
    /// explanation; the query analysis block is always appended.
    pub fn prompt_context(&self) -> String {
        let body = if self.digest.is_empty() {
            format!("No relevant content could be retrieved from {}.", self.site)
        } else {
            self.digest.text.clone()
        };

        body + &self.intent.guidance(&self.site, &self.cleaned_query)
    }

    /// URLs cited by the digest, each once
    pub fn source_urls(&self) -> &[String] {
        &self.digest.sources
    }
}

/// Counters for both engine caches
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EngineCacheStats {
    pub queries: CacheStats,
    pub sites: CacheStats,
}

/// On-demand retrieval engine
///
/// Safe to share between tasks behind an `Arc`; the caches are the only
/// shared mutable state.
pub struct RetrievalEngine {
    config: Config,
    crawler: Crawler,
    formatter: DigestFormatter,
    query_cache: Arc<TtlCache<Vec<ExtractedPage>>>,
    site_cache: Arc<TtlCache<SiteSnapshot>>,
}

impl RetrievalEngine {
    /// Builds an engine from a configuration
    ///
    /// # Errors
    ///
    /// Fails when the configuration does not validate or the HTTP client
    /// cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        validate(&config)?;

        let fetcher = Fetcher::new(&config.fetcher)?;
        let crawler = Crawler::new(fetcher, config.crawler.clone());

        let query_cache = TtlCache::new(chrono::Duration::seconds(
            config.cache.query_ttl_secs as i64,
        ))
        .with_max_entries(config.cache.max_entries);
        let site_cache = TtlCache::new(chrono::Duration::seconds(
            config.cache.site_ttl_secs as i64,
        ))
        .with_max_entries(config.cache.max_entries);

        Ok(Self {
            config,
            crawler,
            formatter: DigestFormatter::default(),
            query_cache: Arc::new(query_cache),
            site_cache: Arc::new(site_cache),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Answers a raw user query with prompt context
    ///
    /// # Flow
    ///
    /// 1. Resolve the target site from the query, or use the configured base URL
    /// 2. Widen the question according to its intent
    /// 3. Return cached pages for `(site, query)` if still fresh
    /// 4. Otherwise fetch the named page (if any) and crawl the site, then
    ///    cache the ranked result unless it is empty
    /// 5. Render the digest
    ///
    /// Fetch failures never surface here; the worst case is an empty digest.
    pub async fn retrieve(&self, raw_query: &str) -> Result<RetrievedContext> {
        let (target, cleaned_query) = extract_target(raw_query);
        let site = match &target {
            Some(url) => site_root(url),
            None => site_root(&Url::parse(&self.config.engine.base_url)?),
        };

        let intent = QueryIntent::analyze(&cleaned_query);
        let scraping_query = intent.scraping_query(&cleaned_query);
        let key = cache_key(&site, &normalize_query(&scraping_query));

        let (pages, from_cache) = match self.query_cache.get(&key) {
            Some(pages) => {
                tracing::info!("Cache hit for {} ({} pages)", key, pages.len());
                (pages, true)
            }
            None => {
                tracing::info!("Cache miss for {}, crawling {}", key, site);
                let pages = self
                    .collect_pages(&site, target.as_ref(), &scraping_query)
                    .await;

                if pages.is_empty() {
                    tracing::warn!("No relevant pages found on {}", site);
                    (Arc::new(pages), false)
                } else {
                    let stored = self.query_cache.set(key, pages);
                    self.query_cache.sweep();
                    (stored, false)
                }
            }
        };

        let digest = self.formatter.render(&pages, &scraping_query);

        Ok(RetrievedContext {
            site,
            cleaned_query,
            scraping_query,
            intent,
            digest,
            from_cache,
        })
    }

    /// Fetches the named page and crawls its site, returning ranked pages
    async fn collect_pages(
        &self,
        site: &str,
        target: Option<&Url>,
        query: &str,
    ) -> Vec<ExtractedPage> {
        let settings = self.crawler.config();
        let mut pages = Vec::new();

        if let Some(url) = target.filter(|url| !is_site_root(url, site)) {
            match self
                .crawler
                .fetch_page(url.as_str(), query, self.crawler.fetcher().page_timeout())
                .await
            {
                Ok(page) => pages.push(page),
                Err(e) => tracing::warn!("Requested page {} unavailable: {}", url, e),
            }
        }

        let mut related = self
            .crawler
            .crawl(site, query, settings.max_depth, settings.max_pages)
            .await;
        rank_pages(&mut related);
        related.truncate(settings.max_results.saturating_sub(pages.len()));

        pages.extend(related);
        let mut pages = dedupe_by_url(pages);
        rank_pages(&mut pages);
        pages.truncate(settings.max_results);
        pages
    }

    /// Returns a categorized sample of the site at `base`
    ///
    /// Snapshots are cached under the site root with the long TTL. Configured
    /// seed pages on the same site are fetched with the worker pool, then the
    /// site is crawled with the priority keywords as the query.
    pub async fn site_snapshot(&self, base: &str) -> Result<Arc<SiteSnapshot>> {
        let base_url = Url::parse(base)?;
        let site = site_root(&base_url);

        if let Some(snapshot) = self.site_cache.get(&site) {
            tracing::info!("Using cached snapshot of {}", site);
            return Ok(snapshot);
        }

        let settings = &self.config.snapshot;
        let keywords = settings.priority_keywords.join(" ");

        let seeds: Vec<String> = settings
            .seeds
            .iter()
            .filter(|seed| {
                Url::parse(seed)
                    .map(|url| is_same_site(&url, &base_url))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        tracing::info!(
            "Taking snapshot of {} ({} seed pages, up to {} pages)",
            site,
            seeds.len(),
            settings.max_pages
        );

        let mut pages = self
            .crawler
            .fetch_candidates(seeds, &keywords, self.crawler.fetcher().page_timeout())
            .await;
        let crawled = self
            .crawler
            .crawl(
                &site,
                &keywords,
                self.crawler.config().max_depth,
                settings.max_pages,
            )
            .await;
        pages.extend(crawled);

        let mut pages = dedupe_by_url(pages);
        pages.truncate(settings.max_pages);

        let snapshot = SiteSnapshot::new(site.clone(), &pages);
        if snapshot.entries.is_empty() {
            tracing::warn!("Snapshot of {} is empty", site);
            return Ok(Arc::new(snapshot));
        }

        tracing::info!("Snapshot of {} holds {} pages", site, snapshot.entries.len());
        Ok(self.site_cache.set(site, snapshot))
    }

    /// Forgets the cached snapshot of the site at `base`
    pub fn invalidate_snapshot(&self, base: &str) -> Result<bool> {
        let site = site_root(&Url::parse(base)?);
        Ok(self.site_cache.invalidate(&site))
    }

    /// Forgets every cached query result
    pub fn clear_query_cache(&self) {
        self.query_cache.clear();
    }

    pub fn cache_stats(&self) -> EngineCacheStats {
        EngineCacheStats {
            queries: self.query_cache.stats(),
            sites: self.site_cache.stats(),
        }
    }

    /// Starts background sweeping of both caches
    ///
    /// Must be called from within a Tokio runtime. The tasks end on their own
    /// once the engine is dropped.
    pub fn start_sweepers(&self) -> Vec<JoinHandle<()>> {
        let interval = std::time::Duration::from_secs(self.config.cache.sweep_interval_secs);
        vec![
            self.query_cache.spawn_sweeper(interval),
            self.site_cache.spawn_sweeper(interval),
        ]
    }
}

/// Whether `url` is just the root of `site`
fn is_site_root(url: &Url, site: &str) -> bool {
    match (normalize_url(url.as_str()), normalize_url(site)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Drops later pages whose URL was already seen
fn dedupe_by_url(pages: Vec<ExtractedPage>) -> Vec<ExtractedPage> {
    let mut seen = HashSet::new();
    pages
        .into_iter()
        .filter(|page| {
            let key = normalize_url(&page.url)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| page.url.clone());
            seen.insert(key)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn page(url: &str, score: f64) -> ExtractedPage {
        ExtractedPage {
            url: url.to_string(),
            title: String::new(),
            description: String::new(),
            headings: Vec::new(),
            paragraphs: Vec::new(),
            lists: Vec::new(),
            links: Vec::new(),
            forms: Vec::new(),
            steps: Vec::new(),
            relevance_score: score,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let pages = dedupe_by_url(vec![
            page("https://example.edu/fees", 1.0),
            page("https://example.edu/apply", 2.0),
            page("https://example.edu/fees/", 9.0),
        ]);

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].relevance_score, 1.0);
    }

    #[test]
    fn test_is_site_root() {
        let root = Url::parse("https://example.edu/").unwrap();
        let page = Url::parse("https://example.edu/admissions").unwrap();
        assert!(is_site_root(&root, "https://example.edu"));
        assert!(!is_site_root(&page, "https://example.edu"));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = Config::default();
        config.crawler.fetch_workers = 0;
        assert!(RetrievalEngine::new(config).is_err());
    }

    #[test]
    fn test_prompt_context_placeholder_when_empty() {
        let context = RetrievedContext {
            site: "https://example.edu".to_string(),
            cleaned_query: "tuition".to_string(),
            scraping_query: "tuition".to_string(),
            intent: QueryIntent::default(),
            digest: Digest::default(),
            from_cache: false,
        };

        let text = context.prompt_context();
        assert!(text.starts_with("No relevant content could be retrieved from https://example.edu."));
        assert!(text.contains("User Query Analysis:"));
        assert!(context.source_urls().is_empty());
    }

    #[tokio::test]
    async fn test_sweepers_end_with_engine() {
        let engine = RetrievalEngine::new(Config::default()).unwrap();
        let handles = engine.start_sweepers();
        assert_eq!(handles.len(), 2);

        drop(engine);
        for handle in handles {
            handle.abort();
            let _ = handle.await;
        }
    }

    #[tokio::test]
    async fn test_unreachable_site_yields_placeholder() {
        let mut config = Config::default();
        config.engine.base_url = "http://127.0.0.1:9".to_string();
        config.fetcher.crawl_timeout_secs = 1;
        config.fetcher.page_timeout_secs = 1;
        let engine = RetrievalEngine::new(config).unwrap();

        let context = engine.retrieve("tuition fees").await.unwrap();
        assert!(context.digest.is_empty());
        assert!(!context.from_cache);
        // Empty results are not cached
        assert_eq!(engine.cache_stats().queries.entries, 0);
    }
}
