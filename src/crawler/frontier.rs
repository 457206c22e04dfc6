//! Crawl frontier: the to-visit queue of one crawl
//!
//! The frontier is a two-tier approximation of a priority queue: links that
//! match the query go to the front, everything else to the back. Priority
//! links found on the same page keep their discovery order.

use std::collections::{HashSet, VecDeque};

/// A URL waiting to be visited, with its link distance from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: u32,
}

/// Frontier state owned by a single crawl
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier holding only the seed at depth 0
    pub fn new(seed: impl Into<String>) -> Self {
        let mut frontier = Self::default();
        frontier.push_back(seed.into(), 0);
        frontier
    }

    /// Removes and returns the front entry
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        let entry = self.queue.pop_front()?;
        self.queued.remove(&entry.url);
        Some(entry)
    }

    /// Queues a link ahead of everything else
    pub fn push_front(&mut self, url: String, depth: u32) {
        self.queued.insert(url.clone());
        self.queue.push_front(FrontierEntry { url, depth });
    }

    /// Queues a page's priority links ahead of everything else, in the order given
    pub fn push_front_batch(&mut self, urls: Vec<String>, depth: u32) {
        for url in urls.into_iter().rev() {
            self.push_front(url, depth);
        }
    }

    /// Queues a link behind everything else
    pub fn push_back(&mut self, url: String, depth: u32) {
        self.queued.insert(url.clone());
        self.queue.push_back(FrontierEntry { url, depth });
    }

    /// Whether the URL has neither been visited nor queued yet
    pub fn is_new(&self, url: &str) -> bool {
        !self.visited.contains(url) && !self.queued.contains(url)
    }

    pub fn mark_visited(&mut self, url: &str) {
        self.visited.insert(url.to_string());
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Number of URLs visited so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Returns the number of entries waiting in the queue
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
