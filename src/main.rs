//! # Zhihu Daily Spider
//!
//! Crawls the Zhihu Daily news feed and normalizes every story into a
//! canonical post record for downstream storage.
//!
//! ## Usage
//!
//! ```sh
//! zhihu_daily_spider -o ./posts            # latest snapshot
//! zhihu_daily_spider -o ./posts -d 20191112 # snapshot for a given day
//! ```
//!
//! ## Architecture
//!
//! The application follows a two-stage pipeline:
//! 1. **Feed stage**: one index request resolves the snapshot date and
//!    the list of story stubs, with featured stories tagged
//! 2. **Detail stage**: one request per story, fanned out concurrently;
//!    each task validates, sanitizes, and completes its own record
//! 3. **Hand-off**: completed records are written as per-story JSON
//!    files grouped by publication date

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod error;
mod models;
mod outputs;
mod plugin;
mod spider;
mod utils;

use cli::Cli;
use error::SpiderError;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
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
    info!(
        spider = plugin::SPIDER.name,
        display_name = plugin::SPIDER.display_name,
        "spider starting up"
    );

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.date, ?args.output_dir, ?args.feed_base, "Parsed CLI arguments");

    // Early check: ensure the output dir is writable
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Feed stage ----
    let feed_url = match spider::feed::feed_url(&args.feed_base, args.date.as_deref()) {
        Ok(url) => url,
        Err(e @ SpiderError::InvalidDateFormat(_)) => {
            // A bad date yields an empty task set, not a failed run.
            error!(error = %e, "nothing to crawl");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    info!(url = %feed_url, "fetching feed index");
    let feed_body = reqwest::get(feed_url).await?.bytes().await?;
    let envelope = spider::feed::parse_feed(&feed_body)?;
    info!(
        date = %envelope.date,
        count = envelope.items.len(),
        "feed envelope parsed"
    );

    let tasks = spider::feed::build_tasks(&args.feed_base, &envelope);

    // ---- Detail stage ----
    let posts = spider::detail::fetch_posts(tasks, args.concurrency).await;

    // ---- Storage hand-off ----
    let mut written = 0usize;
    for (id, post) in &posts {
        match outputs::json::write_post(id, post, &args.output_dir).await {
            Ok(()) => written += 1,
            Err(e) => error!(%id, error = %e, "failed to write post record"),
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        stories = envelope.items.len(),
        resolved = posts.len(),
        written,
        ?elapsed,
        "crawl complete"
    );

    Ok(())
}
