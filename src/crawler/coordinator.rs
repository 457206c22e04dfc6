//! Crawler coordinator - bounded, priority-biased site traversal
//!
//! This module contains the crawl loop that ties the fetcher, extractor and
//! scorer together:
//! - Sequential frontier-driven discovery from a seed URL
//! - Query-matching links queued ahead of the rest
//! - A mandatory politeness delay between fetches
//! - Bounded-parallel fetching of an already-known list of candidate pages

use crate::config::CrawlerConfig;
use crate::crawler::extractor::extract;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::page::ExtractedPage;
use crate::crawler::scorer::{contains_any_term, query_terms};
use crate::url::normalize_url;
use crate::EngineError;
use futures::stream::{self, StreamExt};
use std::time::Duration;

/// Crawls one site at a time for pages relevant to a query
#[derive(Debug, Clone)]
pub struct Crawler {
    fetcher: Fetcher,
    config: CrawlerConfig,
}

impl Crawler {
    /// Creates a new crawler
    ///
    /// # Arguments
    ///
    /// * `fetcher` - The HTTP fetcher used for every page
    /// * `config` - Depth, page budget, politeness delay and worker cap
    pub fn new(fetcher: Fetcher, config: CrawlerConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Fetches, extracts and scores a single page
    pub async fn fetch_page(
        &self,
        url: &str,
        query: &str,
        timeout: Duration,
    ) -> Result<ExtractedPage, EngineError> {
        let body = self.fetcher.fetch(url, timeout).await?;
        let page = extract(&body, url)?;
        Ok(page.scored(query))
    }

    /// Runs a breadth-first, priority-biased crawl from `seed`
    ///
    /// # Crawl Loop
    ///
    /// While the frontier is non-empty and fewer than `max_pages` pages have
    /// been collected or visited:
    /// 1. Pop the front entry; skip it if already visited or deeper than `max_depth`
    /// 2. Mark it visited, fetch and extract it; a failure skips the URL
    /// 3. Collect the page if its rendered text contains any query term
    /// 4. Queue unseen same-site links one level deeper (only while
    ///    `depth < max_depth`): links whose text or URL contains a query term go
    ///    to the front, the rest to the back
    ///
    /// An empty query collects every page that was fetched.
    ///
    /// # Returns
    ///
    /// Collected pages in visitation order, each scored against `query`.
    /// Callers that need ranked output sort with [`rank_pages`].
    pub async fn crawl(
        &self,
        seed: &str,
        query: &str,
        max_depth: u32,
        max_pages: usize,
    ) -> Vec<ExtractedPage> {
        let seed = match normalize_url(seed) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::warn!("Cannot crawl from seed {}: {}", seed, e);
                return Vec::new();
            }
        };

        tracing::info!(
            "Crawling {} for '{}' (max depth {}, max pages {})",
            seed,
            query,
            max_depth,
            max_pages
        );

        let terms = query_terms(query);
        let delay = Duration::from_millis(self.config.politeness_delay_ms);
        let mut frontier = Frontier::new(seed);
        let mut results = Vec::new();

        while results.len() < max_pages && frontier.visited_count() < max_pages {
            let Some(entry) = frontier.pop() else {
                break;
            };

            if frontier.is_visited(&entry.url) {
                continue;
            }
            if entry.depth > max_depth {
                tracing::debug!("Discarding {} at depth {}", entry.url, entry.depth);
                continue;
            }

            if frontier.visited_count() > 0 {
                tokio::time::sleep(delay).await;
            }
            frontier.mark_visited(&entry.url);

            let page = match self
                .fetch_page(&entry.url, query, self.fetcher.crawl_timeout())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", entry.url, e);
                    continue;
                }
            };

            if entry.depth < max_depth {
                enqueue_links(&mut frontier, &page, &terms, entry.depth + 1);
            }

            if terms.is_empty() || contains_any_term(&page.rendered_text(), &terms) {
                tracing::debug!(
                    "Collected {} (depth {}, score {})",
                    page.url,
                    entry.depth,
                    page.relevance_score
                );
                results.push(page);
            }
        }

        tracing::info!(
            "Crawl finished: {} relevant pages from {} visited, {} left in frontier",
            results.len(),
            frontier.visited_count(),
            frontier.len()
        );

        results
    }

    /// Fetches a known list of pages with bounded parallelism
    ///
    /// At most `fetch_workers` requests are in flight. Failed pages are
    /// dropped. The result is ranked by score once every worker has finished,
    /// ties ordered by URL, so completion order never leaks into the output.
    pub async fn fetch_candidates(
        &self,
        urls: Vec<String>,
        query: &str,
        timeout: Duration,
    ) -> Vec<ExtractedPage> {
        let workers = self.config.fetch_workers.max(1);

        let mut pages: Vec<ExtractedPage> = stream::iter(urls.into_iter().map(|url| async move {
            match self.fetch_page(&url, query, timeout).await {
                Ok(page) => Some(page),
                Err(e) => {
                    tracing::warn!("Skipping candidate {}: {}", url, e);
                    None
                }
            }
        }))
        .buffer_unordered(workers)
        .filter_map(|page| async move { page })
        .collect()
        .await;

        pages.sort_by(|a, b| a.url.cmp(&b.url));
        rank_pages(&mut pages);
        pages
    }
}

/// Sorts pages by relevance score, highest first
///
/// The sort is stable: pages with equal scores keep their relative order.
pub fn rank_pages(pages: &mut [ExtractedPage]) {
    pages.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
}

/// Queues a page's unseen links at `depth`
fn enqueue_links(frontier: &mut Frontier, page: &ExtractedPage, terms: &[String], depth: u32) {
    let mut priority: Vec<String> = Vec::new();

    for link in &page.links {
        let url = match normalize_url(&link.url) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::debug!("Failed to normalize URL {}: {}", link.url, e);
                continue;
            }
        };

        if !frontier.is_new(&url) || priority.contains(&url) {
            continue;
        }

        if contains_any_term(&link.text, terms) || contains_any_term(&url, terms) {
            priority.push(url);
        } else {
            frontier.push_back(url, depth);
        }
    }

    frontier.push_front_batch(priority, depth);
}
