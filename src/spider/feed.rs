//! Feed index stage: endpoint selection, envelope parsing, task fan-out.
//!
//! # Endpoints
//!
//! Without a date the spider crawls `<base>/latest`. With a `YYYYMMDD`
//! date it crawls `<base>/before/<date + 1 day>`: the API's `before`
//! endpoint is exclusive of the given day, so the requested snapshot date
//! has to be shifted forward by one day before it goes on the wire.

use crate::error::{Result, SpiderError};
use crate::models::{DetailTask, FeedEnvelope, ItemStub, MetaPair, PostDraft, RawFeed};
use crate::plugin;
use crate::utils::truncate_for_log;
use chrono::{Duration, NaiveDate};
use std::collections::HashSet;
use tracing::{debug, info, instrument};
use url::Url;

/// Build the feed index URL for an optional `YYYYMMDD` snapshot date.
///
/// # Errors
///
/// Returns [`SpiderError::InvalidDateFormat`] when the date string does
/// not parse. Callers treat that as "zero tasks", not as a crash.
#[instrument(level = "info", skip(base))]
pub fn feed_url(base: &str, date: Option<&str>) -> Result<Url> {
    let base = base.trim_end_matches('/');
    match date {
        None => Ok(Url::parse(&format!("{}/latest", base))?),
        Some(raw) => {
            info!(date = raw, "crawl date requested");
            let day = NaiveDate::parse_from_str(raw, "%Y%m%d")
                .map_err(|_| SpiderError::InvalidDateFormat(raw.to_string()))?;
            let shifted = (day + Duration::days(1)).format("%Y%m%d").to_string();
            info!(before = %shifted, "shifted crawl date for the before endpoint");
            Ok(Url::parse(&format!("{}/before/{}", base, shifted))?)
        }
    }
}

/// Parse a feed index response body into a [`FeedEnvelope`].
///
/// Featured stories are tagged by membership in `top_stories`. Each
/// featured id tags at most the first matching story in feed order; ids
/// with no match are silently ignored.
///
/// # Errors
///
/// Returns [`SpiderError::MalformedFeedPayload`] when the body is not
/// UTF-8 JSON of the expected shape or its `date` field is unusable.
/// This aborts the whole run: no tasks can be derived without an
/// envelope.
pub fn parse_feed(body: &[u8]) -> Result<FeedEnvelope> {
    let text = std::str::from_utf8(body)
        .map_err(|e| SpiderError::MalformedFeedPayload(e.to_string()))?;
    debug!(body = %truncate_for_log(text, 300), "raw feed body");

    let raw: RawFeed = serde_json::from_str(text)
        .map_err(|e| SpiderError::MalformedFeedPayload(e.to_string()))?;

    let date = NaiveDate::parse_from_str(&raw.date, "%Y%m%d").map_err(|_| {
        SpiderError::MalformedFeedPayload(format!("unparseable date field: {}", raw.date))
    })?;
    info!(date = %date, "feed publication date");

    let mut featured: HashSet<String> = raw
        .top_stories
        .unwrap_or_default()
        .into_iter()
        .map(|stub| stub.id.to_string())
        .collect();
    if !featured.is_empty() {
        info!(count = featured.len(), "tagging featured stories");
    }

    let items = raw
        .stories
        .into_iter()
        .map(|stub| {
            let id = stub.id.to_string();
            // remove() keeps the tag on the first match only when the
            // feed repeats an id
            let is_featured = featured.remove(&id);
            ItemStub { id, featured: is_featured }
        })
        .collect::<Vec<_>>();

    info!(count = items.len(), "parsed feed envelope");
    Ok(FeedEnvelope { date, items })
}

/// Fan the envelope out into one detail-fetch task per story, in feed
/// order, each carrying the draft record the detail stage will complete.
pub fn build_tasks(base: &str, envelope: &FeedEnvelope) -> Vec<DetailTask> {
    let base = base.trim_end_matches('/');
    envelope
        .items
        .iter()
        .map(|item| {
            debug!(id = %item.id, featured = item.featured, "queueing story");
            DetailTask {
                id: item.id.clone(),
                url: format!("{}/{}", base, item.id),
                draft: PostDraft {
                    spider: plugin::SPIDER.name,
                    date: envelope.date,
                    meta: vec![
                        MetaPair::new("spider.zhihu_daily.id", item.id.clone()),
                        MetaPair::new(
                            "spider.zhihu_daily.top",
                            if item.featured { "1" } else { "0" },
                        ),
                    ],
                },
            }
        })
        .collect()
}
