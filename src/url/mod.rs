//! URL handling module for Site-Digest
//!
//! This module provides URL normalization for crawl identity, host
//! extraction, same-site comparison and site-root derivation.

mod domain;
mod normalize;

pub use domain::{extract_domain, is_same_site, registrable_host, site_root};
pub use normalize::normalize_url;
