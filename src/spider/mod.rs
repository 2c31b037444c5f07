//! The two-stage fetch-and-normalize pipeline.
//!
//! Crawling runs in two phases:
//!
//! 1. **Feed stage** ([`feed`]): build the index endpoint for the
//!    requested snapshot date, parse the envelope, tag featured stories,
//!    and fan out one detail-fetch task per story.
//! 2. **Detail stage** ([`detail`]): fetch each story's payload,
//!    validate required fields, sanitize the HTML body, and complete the
//!    draft into a normalized post record.
//!
//! Feed-stage failures abort the run; detail-stage failures drop only
//! the story they occurred on.

pub mod detail;
pub mod feed;

/// Base URL of the Zhihu Daily news API.
pub const DEFAULT_FEED_BASE: &str = "https://news-at.zhihu.com/api/4/news";
