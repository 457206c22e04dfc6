//! Integration tests for the retrieval engine
//!
//! Full retrievals against a mock site: caching, requested pages, digests and
//! site snapshots.

use crate::common::{html_page, requested_paths, test_config};
use site_digest::engine::Category;
use site_digest::RetrievalEngine;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_school_site(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            "Example Academy",
            r#"<header><h1>Example Academy</h1></header>
            <h1>Welcome to Example Academy</h1>
            <p>We publish our tuition schedule every school year.</p>
            <a href="/tuition">Tuition and fees</a>
            <a href="/about">About us</a>"#,
        ))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tuition"))
        .respond_with(html_page(
            "Tuition",
            r#"<h1>Tuition</h1>
            <p>Tuition is paid in two installments each school year.</p>
            <ol><li>Step 1: Download the tuition form</li><li>Step 2: Pay at the cashier</li></ol>"#,
        ))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html_page(
            "About",
            "<h1>About the academy</h1><p>Founded as a small community school.</p>",
        ))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_retrieve_builds_digest() {
    let mock_server = MockServer::start().await;
    mount_school_site(&mock_server).await;

    let engine = RetrievalEngine::new(test_config(&mock_server.uri())).unwrap();
    let context = engine.retrieve("tuition").await.unwrap();

    assert_eq!(context.site, mock_server.uri());
    assert_eq!(context.scraping_query, "tuition");
    assert!(!context.from_cache);

    let tuition_url = format!("{}/tuition", mock_server.uri());
    assert_eq!(context.source_urls()[0], tuition_url);
    assert_eq!(
        context
            .source_urls()
            .iter()
            .filter(|url| **url == tuition_url)
            .count(),
        1
    );

    let prompt = context.prompt_context();
    assert!(prompt.starts_with("=== LIVE WEBSITE CONTENT ===\nQuery: tuition\n"));
    assert!(prompt.contains("[Page: Tuition]"));
    assert!(prompt.contains("Step-by-step instructions:\n1. Step 1: Download the tuition form"));
    assert!(prompt.contains("User Query Analysis:"));
    // The <header> heading was stripped before extraction
    assert!(prompt.contains("Brief excerpt: Welcome to Example Academy"));
}

#[tokio::test]
async fn test_second_retrieval_served_from_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            "Home",
            "<h1>Transport</h1><p>School buses leave at three in the afternoon.</p>",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let engine = RetrievalEngine::new(test_config(&mock_server.uri())).unwrap();

    let first = engine.retrieve("transport").await.unwrap();
    let second = engine.retrieve("  Transport ").await.unwrap();

    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(first.digest.sources, second.digest.sources);
    assert_eq!(engine.cache_stats().queries.entries, 1);
}

#[tokio::test]
async fn test_empty_results_are_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&mock_server)
        .await;

    let engine = RetrievalEngine::new(test_config(&mock_server.uri())).unwrap();

    let first = engine.retrieve("canteen menu").await.unwrap();
    let second = engine.retrieve("canteen menu").await.unwrap();

    assert!(first.digest.is_empty());
    assert!(!second.from_cache);
    assert!(second
        .prompt_context()
        .starts_with("No relevant content could be retrieved"));
}

#[tokio::test]
async fn test_requested_page_fetched_first() {
    let mock_server = MockServer::start().await;
    mount_school_site(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/tuition/2025"))
        .respond_with(html_page(
            "Tuition 2025",
            "<h1>Tuition for 2025</h1><p>The tuition for 2025 was approved in March.</p>",
        ))
        .mount(&mock_server)
        .await;

    let mut config = test_config("https://unused.example.com");
    config.crawler.max_depth = 0;
    let engine = RetrievalEngine::new(config).unwrap();

    let query = format!("tuition {}/tuition/2025", mock_server.uri());
    let context = engine.retrieve(&query).await.unwrap();

    assert_eq!(context.cleaned_query, "tuition");
    assert_eq!(context.site, mock_server.uri());
    assert_eq!(requested_paths(&mock_server).await, vec!["/tuition/2025", "/"]);
    assert!(context
        .source_urls()
        .contains(&format!("{}/tuition/2025", mock_server.uri())));
}

#[tokio::test]
async fn test_site_snapshot_categorizes_and_caches() {
    let mock_server = MockServer::start().await;
    mount_school_site(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/contact"))
        .respond_with(html_page(
            "Contact",
            "<h1>Contact the registrar</h1><p>Call the registrar during office hours.</p>",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server.uri());
    config.snapshot.seeds = vec![format!("{}/contact", mock_server.uri())];
    let engine = RetrievalEngine::new(config).unwrap();

    let snapshot = engine.site_snapshot(&mock_server.uri()).await.unwrap();

    let categories: Vec<Category> = snapshot.entries.iter().map(|e| e.category).collect();
    assert_eq!(categories[0], Category::Contact);
    assert!(categories.contains(&Category::FeesTuition));
    assert!(categories.contains(&Category::About));
    assert!(snapshot
        .entries
        .iter()
        .all(|e| e.tags.starts_with(&["website".to_string(), "live_content".to_string()])));

    let again = engine.site_snapshot(&mock_server.uri()).await.unwrap();
    assert_eq!(again.taken_at, snapshot.taken_at);
    assert_eq!(engine.cache_stats().sites.entries, 1);

    assert!(engine.invalidate_snapshot(&mock_server.uri()).unwrap());
    assert_eq!(engine.cache_stats().sites.entries, 0);
}
