use crate::config::types::{
    CacheConfig, Config, CrawlerConfig, EngineConfig, FetcherConfig, SnapshotConfig,
};
use crate::ConfigError;
use url::Url;

/// Longest timeout accepted for a single fetch (seconds)
const MAX_TIMEOUT_SECS: u64 = 30;

/// Largest worker pool accepted for candidate fetches
const MAX_FETCH_WORKERS: usize = 16;

/// Longest cache TTL or sweep interval accepted (30 days)
const MAX_CACHE_SECS: u64 = 30 * 24 * 60 * 60;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_engine_config(&config.engine)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_crawler_config(&config.crawler)?;
    validate_cache_config(&config.cache)?;
    validate_snapshot_config(&config.snapshot)?;
    Ok(())
}

fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    validate_http_url(&config.base_url, "base-url")
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    for (name, value) in [
        ("crawl-timeout-secs", config.crawl_timeout_secs),
        ("page-timeout-secs", config.page_timeout_secs),
    ] {
        if value < 1 || value > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and {}, got {}",
                name, MAX_TIMEOUT_SECS, value
            )));
        }
    }

    if config.crawl_timeout_secs > config.page_timeout_secs {
        return Err(ConfigError::Validation(format!(
            "crawl-timeout-secs ({}) cannot exceed page-timeout-secs ({})",
            config.crawl_timeout_secs, config.page_timeout_secs
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_results < 1 {
        return Err(ConfigError::Validation(format!(
            "max-results must be >= 1, got {}",
            config.max_results
        )));
    }

    // The delay between fetches is never skipped
    if config.politeness_delay_ms < 1 {
        return Err(ConfigError::Validation(
            "politeness-delay-ms must be >= 1ms".to_string(),
        ));
    }

    if config.fetch_workers < 1 || config.fetch_workers > MAX_FETCH_WORKERS {
        return Err(ConfigError::Validation(format!(
            "fetch-workers must be between 1 and {}, got {}",
            MAX_FETCH_WORKERS, config.fetch_workers
        )));
    }

    Ok(())
}

fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("query-ttl-secs", config.query_ttl_secs),
        ("site-ttl-secs", config.site_ttl_secs),
        ("sweep-interval-secs", config.sweep_interval_secs),
    ] {
        if value < 1 || value > MAX_CACHE_SECS {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and {}, got {}",
                name, MAX_CACHE_SECS, value
            )));
        }
    }

    if config.max_entries == Some(0) {
        return Err(ConfigError::Validation(
            "max-entries must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_snapshot_config(config: &SnapshotConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "snapshot max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    for seed in &config.seeds {
        validate_http_url(seed, "snapshot seed")?;
    }

    Ok(())
}

/// Checks that a configured URL is absolute and uses HTTP(S)
fn validate_http_url(value: &str, field: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            field, value
        )));
    }

    Ok(())
}
