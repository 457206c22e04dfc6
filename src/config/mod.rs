//! Configuration module for Site-Digest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section and key is optional, so an empty file yields the defaults.
//!
//! # Example
//!
//! ```no_run
//! use site_digest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("site-digest.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CacheConfig, Config, CrawlerConfig, EngineConfig, FetcherConfig, SnapshotConfig,
};

// Re-export parser functions
pub use parser::{config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
