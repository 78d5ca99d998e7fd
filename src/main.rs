//! Website Checker main entry point
//!
//! This is the command-line interface for the website checker crawler.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use website_checker::config::{load_config_with_hash, validate, Config, CrawlMode};
use website_checker::normalize_url;
use website_checker::output::{
    generate_markdown_summary, CrawlSummary, DiscardSink, ResourceSink, SqliteSink,
    TracingProgress,
};
use website_checker::CrawlEngine;

/// Website Checker: crawls a site and records every resource it reaches
///
/// The crawl is bounded by URL budget and depth, honors robots.txt, skips
/// duplicate content, and follows links according to the selected mode.
#[derive(Parser, Debug)]
#[command(name = "website-checker")]
#[command(version)]
#[command(about = "Crawls a website and records per-resource metadata", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// URL to start crawling from (https:// is assumed when no scheme is given)
    #[arg(value_name = "URL")]
    url: String,

    /// Override the crawl mode
    #[arg(long, value_enum)]
    mode: Option<CrawlMode>,

    /// Override the URL budget
    #[arg(long)]
    max_urls: Option<usize>,

    /// Override the maximum link depth
    #[arg(long)]
    max_depth: Option<u32>,

    /// Override the number of concurrent workers (1-16)
    #[arg(long)]
    workers: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid configuration after command-line overrides")?;

    if cli.dry_run {
        return handle_dry_run(&config, &cli.url);
    }

    handle_crawl(config, config_hash, &cli.url).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("website_checker=info,warn"),
            1 => EnvFilter::new("website_checker=debug,info"),
            2 => EnvFilter::new("website_checker=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Command-line flags take precedence over the config file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(mode) = cli.mode {
        config.crawl.mode = mode;
    }
    if let Some(max_urls) = cli.max_urls {
        config.crawl.max_urls = max_urls;
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawl.max_depth = max_depth;
    }
    if let Some(workers) = cli.workers {
        config.crawl.worker_count = workers;
    }
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, url: &str) -> anyhow::Result<()> {
    let start = normalize_url(url).with_context(|| format!("Invalid start URL '{}'", url))?;
    let crawl = &config.crawl;

    println!("=== Website Checker Dry Run ===\n");
    println!("Start URL: {}", start);

    println!("\nCrawl Configuration:");
    println!("  Mode: {}", crawl.mode);
    println!("  Max URLs: {}", crawl.max_urls);
    println!("  Max depth: {}", crawl.max_depth);
    println!("  Workers: {}", crawl.effective_worker_count());
    println!("  Follow external links: {}", crawl.follow_external_links);
    println!("  Respect robots.txt: {}", crawl.respect_robots_txt);
    println!("  User agent: {}", crawl.user_agent);
    println!("  Timeout: {}s", crawl.timeout);
    match crawl.mode {
        CrawlMode::Path => println!("  Path restriction: {}", crawl.effective_path_restriction()),
        CrawlMode::Regex => println!(
            "  Regex: {} ({})",
            crawl.regex_pattern.as_deref().unwrap_or(".*"),
            if crawl.regex_is_inclusive {
                "inclusive"
            } else {
                "exclusive"
            }
        ),
        _ => {}
    }

    println!("\nOutput:");
    println!(
        "  Database: {}",
        config
            .output
            .database_path
            .as_deref()
            .unwrap_or("(none; records are discarded, only the summary is kept)")
    );
    println!(
        "  Summary: {}",
        config.output.summary_path.as_deref().unwrap_or("(none)")
    );

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: String, url: &str) -> anyhow::Result<()> {
    let sqlite = match &config.output.database_path {
        Some(path) => Some(Arc::new(
            SqliteSink::open(Path::new(path))
                .with_context(|| format!("Failed to open database {}", path))?,
        )),
        None => None,
    };
    let sink: Arc<dyn ResourceSink> = match &sqlite {
        Some(sqlite) => sqlite.clone(),
        None => {
            tracing::info!("No database-path configured; only the crawl summary is kept");
            Arc::new(DiscardSink)
        }
    };

    let engine = CrawlEngine::new(config.crawl.clone(), sink)?
        .with_progress(Arc::new(TracingProgress::default()))
        .with_config_hash(config_hash);

    let token = engine.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight requests");
            token.cancel();
        }
    });

    let summary = engine.run(url).await?;

    if let Some(sqlite) = &sqlite {
        sqlite.record_summary(&summary)?;
    }
    if let Some(path) = &config.output.summary_path {
        generate_markdown_summary(&summary, Path::new(path))
            .with_context(|| format!("Failed to write summary to {}", path))?;
        println!("✓ Summary written to: {}", path);
    }

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &CrawlSummary) {
    println!("\n=== Crawl {} ===", summary.termination);
    println!("Start URL: {}", summary.normalized_start_url);
    println!("Duration: {:.2}s", summary.duration.as_secs_f64());
    println!("Resources recorded: {}", summary.records_emitted);
    println!("  Succeeded: {}", summary.succeeded);
    println!("  Failed: {}", summary.failed);
    println!("  Duplicates: {}", summary.duplicates);
    println!("  Blocked by robots.txt: {}", summary.robots_blocked);
    println!("Downloaded: {:.1} KiB", summary.bytes_downloaded as f64 / 1024.0);
}
