//! JSON record files for the storage collaborator.

use crate::error::Result;
use crate::models::CompletedPost;
use tokio::fs;
use tracing::{debug, instrument};

/// Write one [`CompletedPost`] to `{output_dir}/{date}/{id}.json`.
///
/// Serialization is compact and field order is fixed by the struct, so
/// repeated runs over the same snapshot produce byte-identical files.
#[instrument(level = "debug", skip_all, fields(id = %id, date = %post.date))]
pub async fn write_post(id: &str, post: &CompletedPost, output_dir: &str) -> Result<()> {
    let json = serde_json::to_string(post)?;

    let dir = format!("{}/{}", output_dir.trim_end_matches('/'), post.date);
    fs::create_dir_all(&dir).await?;

    let path = format!("{}/{}.json", dir, id);
    fs::write(&path, json).await?;
    debug!(%path, "wrote post record");
    Ok(())
}
