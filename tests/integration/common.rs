//! Shared fixtures for the integration tests

use site_digest::config::Config;
use site_digest::{Crawler, Fetcher};
use wiremock::{MockServer, ResponseTemplate};

/// Configuration pointed at a mock server, with short timeouts and delay
pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.engine.base_url = base_url.to_string();
    config.fetcher.crawl_timeout_secs = 2;
    config.fetcher.page_timeout_secs = 2;
    config.crawler.politeness_delay_ms = 10;
    config
}

pub fn test_crawler(config: &Config) -> Crawler {
    let fetcher = Fetcher::new(&config.fetcher).expect("Failed to build fetcher");
    Crawler::new(fetcher, config.crawler.clone())
}

/// A 200 response carrying an HTML page
pub fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ),
        "text/html",
    )
}

/// Paths of every request the server received, in arrival order
pub async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .expect("Request recording is enabled")
        .iter()
        .map(|request| request.url.path().to_string())
        .collect()
}
