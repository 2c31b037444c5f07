//! Detail stage: per-story payload resolution and body sanitization.
//!
//! Each task from the feed stage owns one [`PostDraft`] and resolves
//! independently; a failure here drops that story only and never touches
//! its siblings.
//!
//! # Off-site articles
//!
//! A payload whose `type` discriminant is `1` points at content hosted
//! outside Zhihu Daily. That is a normal terminal state, not an error:
//! the record is emitted metadata-only, with no body and no cover.

use crate::error::{Result, SpiderError};
use crate::models::{CompletedPost, DetailTask, MetaPair, PostDraft, RawDetail};
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use scraper::{Html, Selector};
use tracing::{debug, error, info, instrument, warn};

/// Discriminant value marking an off-site article.
const OFFSITE_ARTICLE: i64 = 1;

/// Fetch and resolve all detail tasks, up to `concurrency` in flight.
///
/// Failed stories are logged and skipped without failing the batch.
/// Completion order is arbitrary; each result is paired with its story
/// id for the storage hand-off.
#[instrument(level = "info", skip_all, fields(count = tasks.len()))]
pub async fn fetch_posts(tasks: Vec<DetailTask>, concurrency: usize) -> Vec<(String, CompletedPost)> {
    let total = tasks.len();
    let posts: Vec<(String, CompletedPost)> = stream::iter(tasks)
        .map(|task| async move {
            let id = task.id.clone();
            match fetch_post(task).await {
                Ok(post) => {
                    debug!(%id, "resolved story");
                    Some((id, post))
                }
                Err(e) => {
                    error!(%id, error = %e, "dropping story");
                    None
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .filter_map(std::future::ready)
        .collect()
        .await;

    info!(
        total,
        resolved = posts.len(),
        dropped = total - posts.len(),
        "detail stage finished"
    );
    posts
}

/// Fetch a single story's detail payload and complete its draft.
#[instrument(level = "debug", skip_all, fields(url = %task.url))]
async fn fetch_post(task: DetailTask) -> Result<CompletedPost> {
    let body = reqwest::get(&task.url).await?.bytes().await?;
    resolve_detail(&task.id, &body, task.draft)
}

/// Resolve one detail response body against its draft.
///
/// # Errors
///
/// All errors here are fatal for this story only:
/// [`SpiderError::MalformedDetailPayload`] when the body does not
/// decode, [`SpiderError::MissingOriginUrl`] and
/// [`SpiderError::MissingTitle`] when required fields are empty.
pub fn resolve_detail(id: &str, body: &[u8], draft: PostDraft) -> Result<CompletedPost> {
    let raw: RawDetail = serde_json::from_slice(body).map_err(|e| {
        SpiderError::MalformedDetailPayload { id: id.to_string(), reason: e.to_string() }
    })?;
    debug!(body = %truncate_for_log(&raw.body, 300), "raw story body");

    if raw.share_url.is_empty() {
        return Err(SpiderError::MissingOriginUrl { id: id.to_string() });
    }
    if raw.title.is_empty() {
        return Err(SpiderError::MissingTitle { origin_url: raw.share_url });
    }

    if raw.kind == OFFSITE_ARTICLE {
        warn!(title = %raw.title, origin_url = %raw.share_url, "off-site article, emitting metadata-only record");
        return Ok(draft.complete(raw.share_url, raw.title, None));
    }

    let content = first_block(&raw.body);

    let mut draft = draft;
    if let Some(cover) = cover_value(raw.image, raw.images) {
        draft.meta.push(MetaPair::new("moear.cover_image_slug", cover));
    }

    Ok(draft.complete(raw.share_url, raw.title, Some(content)))
}

/// Extract the first `div` element of an HTML fragment as serialized
/// markup. A fragment with no such element normalizes to the empty
/// string rather than an error, so stories with bare-text bodies still
/// produce a record.
fn first_block(fragment: &str) -> String {
    let document = Html::parse_fragment(fragment);
    let block_selector = Selector::parse("div").unwrap();
    document
        .select(&block_selector)
        .next()
        .map(|element| element.html())
        .unwrap_or_default()
}

/// Pick the cover image: an explicit `image` field wins over the first
/// entry of the `images` list; empty strings count as absent.
fn cover_value(image: Option<String>, images: Vec<String>) -> Option<String> {
    image
        .filter(|s| !s.is_empty())
        .or_else(|| images.into_iter().next().filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft() -> PostDraft {
        PostDraft {
            spider: "zhihu_daily",
            date: NaiveDate::from_ymd_opt(2019, 11, 12).unwrap(),
            meta: vec![
                MetaPair::new("spider.zhihu_daily.id", "9717030"),
                MetaPair::new("spider.zhihu_daily.top", "0"),
            ],
        }
    }

    #[test]
    fn test_resolve_requires_origin_url() {
        let body = br#"{"share_url": "", "title": "some title", "body": "<div>x</div>"}"#;
        let err = resolve_detail("9717030", body, draft()).unwrap_err();
        assert!(matches!(err, SpiderError::MissingOriginUrl { .. }));
    }

    #[test]
    fn test_resolve_requires_title_and_reports_origin_url() {
        let body = br#"{"share_url": "https://daily.zhihu.com/story/9717030", "title": ""}"#;
        let err = resolve_detail("9717030", body, draft()).unwrap_err();
        match err {
            SpiderError::MissingTitle { origin_url } => {
                assert_eq!(origin_url, "https://daily.zhihu.com/story/9717030");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_rejects_malformed_payload() {
        let err = resolve_detail("9717030", b"<html>502</html>", draft()).unwrap_err();
        assert!(matches!(err, SpiderError::MalformedDetailPayload { .. }));
    }

    #[test]
    fn test_offsite_article_is_metadata_only() {
        let body = r#"{
            "share_url": "https://example.com/elsewhere",
            "title": "站外文章",
            "type": 1,
            "body": "<div>should be ignored</div>",
            "images": ["https://pic.example.com/x.png"]
        }"#
        .as_bytes();
        let post = resolve_detail("9717030", body, draft()).unwrap();
        assert!(post.content.is_none());
        assert!(!post.meta.iter().any(|m| m.name == "moear.cover_image_slug"));
        assert_eq!(post.title, "站外文章");
        assert_eq!(post.origin_url, "https://example.com/elsewhere");
    }

    #[test]
    fn test_body_extraction_takes_first_div() {
        let body = r#"{
            "share_url": "https://daily.zhihu.com/story/9717030",
            "title": "t",
            "body": "<p>lead</p><div class=\"main-wrap\"><p>正文</p></div><div>second</div>"
        }"#
        .as_bytes();
        let post = resolve_detail("9717030", body, draft()).unwrap();
        assert_eq!(
            post.content.as_deref(),
            Some("<div class=\"main-wrap\"><p>正文</p></div>")
        );
    }

    #[test]
    fn test_body_without_block_element_yields_empty_content() {
        let body = br#"{
            "share_url": "https://daily.zhihu.com/story/9717030",
            "title": "t",
            "body": "plain text, no markup"
        }"#;
        let post = resolve_detail("9717030", body, draft()).unwrap();
        assert_eq!(post.content.as_deref(), Some(""));
    }

    #[test]
    fn test_missing_body_field_yields_empty_content() {
        let body = br#"{"share_url": "https://daily.zhihu.com/story/9717030", "title": "t"}"#;
        let post = resolve_detail("9717030", body, draft()).unwrap();
        assert_eq!(post.content.as_deref(), Some(""));
    }

    #[test]
    fn test_cover_falls_back_to_first_images_entry() {
        let body = br#"{
            "share_url": "https://daily.zhihu.com/story/9717030",
            "title": "t",
            "body": "<div>x</div>",
            "images": ["x.png", "z.png"]
        }"#;
        let post = resolve_detail("9717030", body, draft()).unwrap();
        let cover = post.meta.iter().find(|m| m.name == "moear.cover_image_slug");
        assert_eq!(cover.map(|m| m.value.as_str()), Some("x.png"));
    }

    #[test]
    fn test_explicit_cover_preferred_over_fallback() {
        let body = br#"{
            "share_url": "https://daily.zhihu.com/story/9717030",
            "title": "t",
            "body": "<div>x</div>",
            "image": "y.png",
            "images": ["x.png"]
        }"#;
        let post = resolve_detail("9717030", body, draft()).unwrap();
        let cover = post.meta.iter().find(|m| m.name == "moear.cover_image_slug");
        assert_eq!(cover.map(|m| m.value.as_str()), Some("y.png"));
    }

    #[test]
    fn test_no_cover_sources_appends_no_meta() {
        let body = br#"{
            "share_url": "https://daily.zhihu.com/story/9717030",
            "title": "t",
            "body": "<div>x</div>",
            "images": []
        }"#;
        let post = resolve_detail("9717030", body, draft()).unwrap();
        assert_eq!(post.meta.len(), 2);
    }

    #[test]
    fn test_empty_string_cover_counts_as_absent() {
        let body = br#"{
            "share_url": "https://daily.zhihu.com/story/9717030",
            "title": "t",
            "body": "<div>x</div>",
            "image": "",
            "images": [""]
        }"#;
        let post = resolve_detail("9717030", body, draft()).unwrap();
        assert!(!post.meta.iter().any(|m| m.name == "moear.cover_image_slug"));
    }

    #[test]
    fn test_cover_meta_appended_after_feed_meta() {
        let body = br#"{
            "share_url": "https://daily.zhihu.com/story/9717030",
            "title": "t",
            "body": "<div>x</div>",
            "images": ["x.png"]
        }"#;
        let post = resolve_detail("9717030", body, draft()).unwrap();
        let names: Vec<&str> = post.meta.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "spider.zhihu_daily.id",
                "spider.zhihu_daily.top",
                "moear.cover_image_slug",
            ]
        );
    }

    #[test]
    fn test_pipeline_output_is_deterministic() {
        let feed = br#"{
            "date": "20191112",
            "stories": [{"id": "a"}, {"id": "b"}],
            "top_stories": [{"id": "b"}]
        }"#;
        let details: &[&[u8]] = &[
            br#"{"share_url": "https://daily.zhihu.com/story/a", "title": "A", "body": "<div>a</div>", "images": ["a.png"]}"#,
            br#"{"share_url": "https://daily.zhihu.com/story/b", "title": "B", "type": 1}"#,
        ];

        let run = || -> Vec<String> {
            let envelope = crate::spider::feed::parse_feed(feed).unwrap();
            let tasks =
                crate::spider::feed::build_tasks(crate::spider::DEFAULT_FEED_BASE, &envelope);
            tasks
                .into_iter()
                .zip(details)
                .map(|(task, body)| {
                    let post = resolve_detail(&task.id, body, task.draft).unwrap();
                    serde_json::to_string(&post).unwrap()
                })
                .collect()
        };

        assert_eq!(run(), run());
    }
}
