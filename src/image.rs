//! Embedded image materialization.
//!
//! Turns the raw bytes of an embedded picture into a `data:` URL that can be
//! displayed directly without a separate fetch.

use anyhow::anyhow;
use base64::{Engine as _, engine::general_purpose};

use crate::error::{Error, Result};
use crate::tag::Id3Tag;

/// Content type used when an image carries no MIME type of its own
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Encode `data` as a base64 `data:` URL labelled with `mime`.
pub fn data_url(data: &[u8], mime: &str) -> String {
    let content_type = if mime.is_empty() {
        DEFAULT_CONTENT_TYPE
    } else {
        mime
    };
    format!(
        "data:{};base64,{}",
        content_type,
        general_purpose::STANDARD.encode(data)
    )
}

/// Build a `data:` URL for the image at `index` (usually 0, the first image).
///
/// Resolves to `None` when the tag cannot carry images, when there is no
/// image at `index`, or when the image has no data.
pub async fn get_image_data_url(tag: &Id3Tag, index: usize) -> Result<Option<String>> {
    let Some(image) = tag.images().and_then(|images| images.get(index)) else {
        return Ok(None);
    };
    if image.data.is_empty() {
        return Ok(None);
    }

    // Cover art can run to megabytes; keep the encoding off the async workers
    let data = image.data.clone();
    let mime = image.mime.clone();
    let url = tokio::task::spawn_blocking(move || data_url(&data, &mime))
        .await
        .map_err(|e| Error::ImageDecode(anyhow!("image encoding did not complete: {}", e)))?;

    Ok(Some(url))
}
