//! Crawler module for page fetching, extraction and traversal
//!
//! This module contains the core retrieval pipeline, including:
//! - HTTP fetching with per-request timeouts
//! - HTML extraction into structured pages
//! - Query relevance scoring
//! - Priority-biased breadth-first crawling and bounded parallel fetching

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;
mod page;
mod scorer;

pub use coordinator::{rank_pages, Crawler};
pub use extractor::{clean_text, extract, looks_like_step};
pub use fetcher::{build_http_client, Fetcher};
pub use frontier::{Frontier, FrontierEntry};
pub use page::{
    ContentList, ExtractedPage, FormInput, Heading, ListKind, PageForm, PageLink,
};
pub use scorer::{contains_any_term, query_terms, score, NEUTRAL_SCORE};
