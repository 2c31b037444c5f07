//! Data models for feed envelopes and normalized post records.
//!
//! Two layers live here:
//! - Wire structs ([`RawFeed`], [`RawDetail`]) that mirror the JSON the
//!   Zhihu Daily API actually serves.
//! - Domain structs ([`FeedEnvelope`], [`PostDraft`], [`CompletedPost`])
//!   that the pipeline threads from the feed stage through detail
//!   resolution to the storage hand-off.
//!
//! A [`PostDraft`] is owned exclusively by the one detail task that was
//! spawned for its story; there is no sharing between tasks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A story identifier as it appears on the wire.
///
/// The live API serves numeric ids (`id: 9759798`) but mirrors and test
/// fixtures sometimes quote them. Both decode, and everything downstream
/// normalizes to a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoryId {
    Number(u64),
    Text(String),
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoryId::Number(n) => write!(f, "{}", n),
            StoryId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Wire shape of one entry in the feed's `stories` / `top_stories` lists.
///
/// The API sends more fields (title, image hue, ...) but only the id is
/// consumed here; everything else comes from the detail payload.
#[derive(Debug, Deserialize)]
pub struct RawStub {
    pub id: StoryId,
}

/// Wire shape of the feed index response.
#[derive(Debug, Deserialize)]
pub struct RawFeed {
    /// Publication date in `YYYYMMDD` format.
    pub date: String,
    /// Stories published on `date`, in editorial order.
    pub stories: Vec<RawStub>,
    /// Editorially highlighted stories; absent on some snapshots.
    pub top_stories: Option<Vec<RawStub>>,
}

/// Wire shape of a single story's detail response.
#[derive(Debug, Deserialize)]
pub struct RawDetail {
    #[serde(default)]
    pub share_url: String,
    #[serde(default)]
    pub title: String,
    /// Content-type discriminant; `1` marks an off-site article whose
    /// canonical content lives outside Zhihu Daily.
    #[serde(rename = "type", default)]
    pub kind: i64,
    /// HTML fragment with the story body; possibly empty.
    #[serde(default)]
    pub body: String,
    /// Candidate cover images, first entry used as a fallback.
    #[serde(default)]
    pub images: Vec<String>,
    /// Explicit cover image, preferred over `images` when present.
    pub image: Option<String>,
}

/// Parsed feed index for one publication date. Immutable once built.
#[derive(Debug)]
pub struct FeedEnvelope {
    pub date: NaiveDate,
    pub items: Vec<ItemStub>,
}

/// Minimal story reference used to spawn one detail-fetch task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStub {
    pub id: String,
    /// Derived by membership in the feed's `top_stories` list.
    pub featured: bool,
}

/// One named metadata value attached to a post record.
///
/// Pair order is insertion order and is significant: stored output must
/// be reproducible byte for byte across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaPair {
    pub name: String,
    pub value: String,
}

impl MetaPair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Partially built post record, created at feed time and completed by the
/// detail stage.
#[derive(Debug, Clone)]
pub struct PostDraft {
    /// Source name constant, see [`crate::plugin::SPIDER`].
    pub spider: &'static str,
    pub date: NaiveDate,
    pub meta: Vec<MetaPair>,
}

impl PostDraft {
    /// Finish the draft into the terminal record shape. `content` stays
    /// `None` for off-site articles, which are emitted metadata-only.
    pub fn complete(
        self,
        origin_url: String,
        title: String,
        content: Option<String>,
    ) -> CompletedPost {
        CompletedPost {
            spider: self.spider,
            date: self.date.to_string(),
            origin_url,
            title,
            content,
            meta: self.meta,
        }
    }
}

/// Terminal, fully normalized post record handed to the storage
/// collaborator. No mutation occurs after construction.
#[derive(Debug, Serialize)]
pub struct CompletedPost {
    pub spider: &'static str,
    /// Publication date in `YYYY-MM-DD` format.
    pub date: String,
    pub origin_url: String,
    pub title: String,
    /// Sanitized body HTML; omitted from serialized output for off-site
    /// articles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub meta: Vec<MetaPair>,
}

/// One detail-fetch task, fanned out per story by the feed stage.
#[derive(Debug)]
pub struct DetailTask {
    pub id: String,
    pub url: String,
    pub draft: PostDraft,
}
