//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and check visitation
//! order, crawl bounds and failure handling end-to-end.

use crate::common::{html_page, requested_paths, test_config, test_crawler};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_query_matching_link_visited_first() {
    let mock_server = MockServer::start().await;

    // The matching link comes second in the markup
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            "Home",
            r#"<h1>Welcome</h1>
            <a href="/gallery">Photo gallery</a>
            <a href="/enrollment">Admission requirements</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gallery"))
        .respond_with(html_page("Gallery", "<h1>Photos of the campus</h1>"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/enrollment"))
        .respond_with(html_page("Enrollment", "<h1>Admission requirements</h1>"))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let crawler = test_crawler(&config);

    let pages = crawler.crawl(&mock_server.uri(), "admission", 1, 3).await;

    assert_eq!(
        requested_paths(&mock_server).await,
        vec!["/", "/enrollment", "/gallery"]
    );

    // Only the page mentioning the query is collected
    assert_eq!(pages.len(), 1);
    assert!(pages[0].url.ends_with("/enrollment"));
    assert_eq!(pages[0].relevance_score, 1.0);
}

#[tokio::test]
async fn test_crawl_with_depth_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Home", r#"<h1>Fees</h1><a href="/level1">Next</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/level1"))
        .respond_with(html_page(
            "Level 1",
            r#"<h1>Fees at level one</h1><a href="/level2">Deeper</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/level2"))
        .respond_with(html_page("Level 2", "<h1>Fees at level two</h1>"))
        .expect(0) // Never fetched with max_depth=1
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let crawler = test_crawler(&config);

    let pages = crawler.crawl(&mock_server.uri(), "fees", 1, 10).await;

    assert_eq!(pages.len(), 2);
    assert_eq!(requested_paths(&mock_server).await, vec!["/", "/level1"]);
}

#[tokio::test]
async fn test_crawl_with_page_limit() {
    let mock_server = MockServer::start().await;

    let links: String = (1..=5)
        .map(|i| format!(r#"<a href="/page{}">Page {}</a>"#, i, i))
        .collect();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Home", &format!("<h1>Tuition</h1>{}", links)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(html_page("Page", "<h1>Nothing relevant</h1>"))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let crawler = test_crawler(&config);

    let pages = crawler.crawl(&mock_server.uri(), "tuition", 2, 3).await;

    assert_eq!(pages.len(), 1);
    assert_eq!(
        requested_paths(&mock_server).await,
        vec!["/", "/page1", "/page2"]
    );
}

#[tokio::test]
async fn test_failed_pages_are_skipped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            "Home",
            r#"<h1>Scholarship office</h1>
            <a href="/missing">Scholarship archive</a>
            <a href="/broken">Scholarship forms</a>
            <a href="/brochure">Scholarship brochure</a>
            <a href="/scholarships">Scholarship list</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1) // Not retried
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/brochure"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0x25, 0x50, 0x44, 0x46], "application/pdf"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/scholarships"))
        .respond_with(html_page("Scholarships", "<h1>Scholarship list</h1>"))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let crawler = test_crawler(&config);

    let pages = crawler.crawl(&mock_server.uri(), "scholarship", 1, 10).await;

    let urls: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(urls.len(), 2);
    assert!(urls[0].ends_with('/'));
    assert!(urls[1].ends_with("/scholarships"));
}

#[tokio::test]
async fn test_other_sites_are_not_followed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            "Home",
            r#"<h1>Library hours</h1>
            <a href="https://library.example.org/hours">Library hours elsewhere</a>
            <a href="/library">Library</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/library"))
        .respond_with(html_page("Library", "<h1>Library hours</h1>"))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let crawler = test_crawler(&config);

    let pages = crawler.crawl(&mock_server.uri(), "library", 2, 10).await;

    assert_eq!(pages.len(), 2);
    assert!(pages[0]
        .links
        .iter()
        .all(|link| !link.url.contains("library.example.org")));
}

#[tokio::test]
async fn test_politeness_delay_between_fetches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            "Home",
            r#"<h1>Events</h1><a href="/a">Events A</a><a href="/b">Events B</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(html_page("Events", "<h1>Events</h1>"))
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server.uri());
    config.crawler.politeness_delay_ms = 60;
    let crawler = test_crawler(&config);

    let started = Instant::now();
    let pages = crawler.crawl(&mock_server.uri(), "events", 1, 10).await;

    assert_eq!(pages.len(), 3);
    // Two delays separate three fetches
    assert!(started.elapsed() >= Duration::from_millis(120));
}

#[tokio::test]
async fn test_fetch_candidates_ranked_by_score() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/one"))
        .respond_with(html_page("One", "<h1>Uniform policy</h1>"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/three"))
        .respond_with(
            html_page(
                "Three",
                "<h1>Uniform</h1><h2>Uniform sizes</h2><h3>Uniform prices</h3>",
            )
            // Finishes last, yet ranks first
            .set_delay(Duration::from_millis(100)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/two"))
        .respond_with(html_page("Two", "<h1>Uniform</h1><h2>Uniform shop</h2>"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let crawler = test_crawler(&config);

    let urls = ["/one", "/three", "/two", "/down"]
        .iter()
        .map(|p| format!("{}{}", mock_server.uri(), p))
        .collect();

    let pages = crawler
        .fetch_candidates(urls, "uniform", Duration::from_secs(2))
        .await;

    let scores: Vec<f64> = pages.iter().map(|p| p.relevance_score).collect();
    assert_eq!(scores, vec![3.0, 2.0, 1.0]);
    assert!(pages[0].url.ends_with("/three"));
}
