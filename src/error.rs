//! Error types for the crawl pipeline.
//!
//! Failures fall into two severity classes:
//!
//! - **Run-fatal**: [`SpiderError::MalformedFeedPayload`] and transport
//!   errors on the feed request. Without a valid envelope no detail tasks
//!   can be derived, so the whole run aborts.
//! - **Item-fatal**: [`SpiderError::MalformedDetailPayload`],
//!   [`SpiderError::MissingOriginUrl`] and [`SpiderError::MissingTitle`]
//!   drop the single story they occurred on; sibling stories keep going.
//!
//! [`SpiderError::InvalidDateFormat`] is neither: a bad `--date` argument
//! is logged and the run finishes with an empty task set.

use thiserror::Error;

/// All errors produced by the feed and detail stages.
#[derive(Error, Debug)]
pub enum SpiderError {
    /// The caller-supplied crawl date could not be parsed as `YYYYMMDD`.
    #[error("invalid crawl date (expected YYYYMMDD): {0}")]
    InvalidDateFormat(String),

    /// The configured feed base could not be parsed as a URL.
    #[error("invalid feed base URL: {0}")]
    InvalidFeedBase(#[from] url::ParseError),

    /// The feed index response was not valid UTF-8 JSON, or its `date`
    /// field was unusable.
    #[error("malformed feed payload: {0}")]
    MalformedFeedPayload(String),

    /// A story's detail response could not be decoded.
    #[error("malformed detail payload for story {id}: {reason}")]
    MalformedDetailPayload { id: String, reason: String },

    /// The detail payload carried an empty `share_url`.
    #[error("story {id} has an empty origin URL")]
    MissingOriginUrl { id: String },

    /// The detail payload carried an empty `title`. The origin URL has
    /// already been captured at this point and is included for diagnosis.
    #[error("story has an empty title - {origin_url}")]
    MissingTitle { origin_url: String },

    /// HTTP transport errors from reqwest.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to serialize a completed record.
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// File I/O errors while handing records to storage.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for [`SpiderError`].
pub type Result<T> = std::result::Result<T, SpiderError>;
