//! Site-Digest main entry point
//!
//! Command-line front end for the retrieval engine: answers one query and
//! prints the prompt context the engine would hand to a language model.

use anyhow::Context;
use clap::Parser;
use site_digest::config::{load_config_with_hash, Config};
use site_digest::query::normalize_query;
use site_digest::url::site_root;
use site_digest::{extract_target, QueryIntent, RetrievalEngine};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Site-Digest: on-demand web content retrieval
///
/// Crawls a bounded neighborhood of the site named in the query (or the
/// configured default site), ranks what it finds and prints a digest ready
/// to be pasted into a prompt.
#[derive(Parser, Debug)]
#[command(name = "site-digest")]
#[command(version)]
#[command(about = "On-demand web content retrieval for LLM prompts", long_about = None)]
struct Cli {
    /// The question, optionally naming a site or page
    #[arg(value_name = "QUERY", required_unless_present = "snapshot", num_args = 1..)]
    query: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Site to search when the query names none
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Maximum link distance from the site root
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Maximum pages visited per crawl
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Print a categorized snapshot of the site instead of a query digest
    #[arg(long)]
    snapshot: bool,

    /// Validate config and show how the query would be handled without fetching
    #[arg(long, conflicts_with = "snapshot")]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    apply_overrides(&mut config, &cli);

    let query = cli.query.join(" ");

    if cli.dry_run {
        return handle_dry_run(&config, &query);
    }

    let engine = RetrievalEngine::new(config).context("Failed to start retrieval engine")?;

    if cli.snapshot {
        handle_snapshot(&engine, &query, cli.json).await
    } else {
        handle_query(&engine, &query, cli.json).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_digest=info,warn"),
            1 => EnvFilter::new("site_digest=debug,info"),
            2 => EnvFilter::new("site_digest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so stdout carries only the digest
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(base_url) = &cli.base_url {
        config.engine.base_url = base_url.clone();
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
}

/// Handles the --dry-run mode: validates config and shows the resolved query
fn handle_dry_run(config: &Config, query: &str) -> anyhow::Result<()> {
    site_digest::config::validate(config).context("Invalid configuration")?;

    let (target, cleaned) = extract_target(query);
    let site = match &target {
        Some(url) => site_root(url),
        None => site_root(&Url::parse(&config.engine.base_url)?),
    };
    let intent = QueryIntent::analyze(&cleaned);
    let scraping_query = intent.scraping_query(&cleaned);

    println!("=== Site-Digest Dry Run ===\n");

    println!("Query:");
    println!("  Raw: {}", query);
    println!("  Question: {}", cleaned);
    println!("  Scraping query: {}", scraping_query);
    println!("  Cache key: {}:{}", site, normalize_query(&scraping_query));

    println!("\nTarget:");
    println!("  Site: {}", site);
    match &target {
        Some(url) => println!("  Requested page: {}", url),
        None => println!("  Requested page: (none, using base URL)"),
    }

    println!("\nCrawler:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Max results: {}", config.crawler.max_results);
    println!("  Politeness delay: {}ms", config.crawler.politeness_delay_ms);
    println!("  Fetch workers: {}", config.crawler.fetch_workers);

    println!("\nCache:");
    println!("  Query TTL: {}s", config.cache.query_ttl_secs);
    println!("  Site TTL: {}s", config.cache.site_ttl_secs);

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles a regular query: prints prompt context and cited sources
async fn handle_query(engine: &RetrievalEngine, query: &str, json: bool) -> anyhow::Result<()> {
    let context = engine
        .retrieve(query)
        .await
        .with_context(|| format!("Failed to retrieve content for '{}'", query))?;

    tracing::info!(
        "Retrieved {} pages from {}{}",
        context.digest.page_count,
        context.site,
        if context.from_cache { " (cached)" } else { "" }
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&context)?);
        return Ok(());
    }

    println!("{}", context.prompt_context());

    if !context.source_urls().is_empty() {
        println!("Sources:");
        for url in context.source_urls() {
            println!("  - {}", url);
        }
    }

    Ok(())
}

/// Handles the --snapshot mode for the site the query names
async fn handle_snapshot(engine: &RetrievalEngine, query: &str, json: bool) -> anyhow::Result<()> {
    let (target, _) = extract_target(query);
    let base = match target {
        Some(url) => url.to_string(),
        None => engine.config().engine.base_url.clone(),
    };

    let snapshot = engine
        .site_snapshot(&base)
        .await
        .with_context(|| format!("Failed to take snapshot of {}", base))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&*snapshot)?);
    } else {
        print!("{}", snapshot.render());
    }

    Ok(())
}
