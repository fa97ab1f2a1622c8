//! # Real Estate News
//!
//! Aggregates real estate news from syndicated (RSS) search feeds, merges
//! the fresh articles with those recovered from the previously rendered
//! page, removes duplicates, and rewrites a single chronologically sorted
//! static HTML listing.
//!
//! ## Usage
//!
//! ```sh
//! real_estate_news [--config feeds.yaml] [-o real-estate-news.html] [-t template.html]
//! ```
//!
//! ## Architecture
//!
//! The application is a one-shot pipeline:
//! 1. **Recovery**: re-parse the existing output page into prior articles
//! 2. **Fetching**: pull each configured feed sequentially, with a short
//!    politeness pause between requests
//! 3. **Merging**: sort everything newest-first and deduplicate by
//!    `(lowercase title, link)`
//! 4. **Rendering**: write the listing back into the template (or a
//!    standalone page), which seeds the next run's recovery step
//!
//! No error from an individual feed, entry, or the prior page aborts the
//! run; the process always exits 0 on completion.

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod dates;
mod fetch;
mod merge;
mod models;
mod prior;
mod render;

use cli::Cli;
use config::FeedTable;

#[tokio::main]
async fn main() {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("real_estate_news starting up");

    let args = Cli::parse();

    // --- Feed table ---
    let table = match &args.config {
        Some(path) => match FeedTable::load(path) {
            Ok(table) => table,
            Err(e) => {
                warn!(path = %path, error = %e, "Failed to load feed table; using built-in feeds");
                FeedTable::builtin()
            }
        },
        None => FeedTable::builtin(),
    };
    table.warn_on_invalid_urls();
    info!(
        categories = table.categories.len(),
        feeds = table.feed_count(),
        "Loaded feed table"
    );

    // --- Prior state ---
    let prior_articles = prior::extract_existing(&args.output).await;

    // --- Sequential fetch loop ---
    let client = fetch::build_client();
    let mut fresh = Vec::new();
    for category in &table.categories {
        info!(category = %category.name, "Processing category");
        for feed in &category.feeds {
            let articles = fetch::fetch_feed(&client, feed, &category.name).await;
            fresh.extend(articles);
        }
    }
    let fetched = fresh.len();
    info!(fetched, recovered = prior_articles.len(), "Combining fresh and prior articles");

    // --- Merge / dedup ---
    let merged = merge::merge_and_dedup(fresh, prior_articles);

    // Per-category summary, presentation metadata only.
    for (category, feeds) in models::group_articles(&merged) {
        let count: usize = feeds.values().map(Vec::len).sum();
        info!(category, articles = count, "Category summary");
    }

    // --- Render ---
    let fragment = render::news_list_html(&merged, dates::now_eastern());
    if let Err(e) = render::write_output(&fragment, &args.template, &args.output).await {
        error!(path = %args.output, error = %e, "Failed writing output page");
    }

    let elapsed = start_time.elapsed();
    info!(
        fetched,
        unique = merged.len(),
        output = %args.output,
        ?elapsed,
        "Aggregation complete"
    );
}
