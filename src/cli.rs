//! Command-line interface definitions for the Zhihu Daily spider.
//!
//! All options can be provided via command-line flags; the feed base can
//! also come from the environment, which the integration fixtures use to
//! point the spider at a local server.

use crate::spider;
use clap::Parser;

/// Command-line arguments for the spider.
///
/// # Examples
///
/// ```sh
/// # Crawl the latest snapshot
/// zhihu_daily_spider -o ./posts
///
/// # Crawl the snapshot for 2019-11-12
/// zhihu_daily_spider -o ./posts --date 20191112
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Snapshot date to crawl in YYYYMMDD format (defaults to the latest feed)
    #[arg(short, long)]
    pub date: Option<String>,

    /// Output directory for normalized post records
    #[arg(short, long, default_value = "./posts")]
    pub output_dir: String,

    /// Base URL of the Zhihu Daily news API
    #[arg(long, env = "ZHIHU_FEED_BASE", default_value = spider::DEFAULT_FEED_BASE)]
    pub feed_base: String,

    /// Maximum number of detail requests in flight
    #[arg(long, default_value_t = 8)]
    pub concurrency: usize,
}
