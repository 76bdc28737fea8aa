//! Cat image uploads.
//!
//! Images arrive inline as `data:image/<type>;base64,<payload>` strings. They are
//! decoded during validation and written below the media root under a random
//! file name; the cat row stores the path relative to that root.

use crate::config::settings::MediaConfig;
use crate::errors::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;
use tracing::{debug, warn};

/// Directory, relative to the media root, holding cat images.
pub const IMAGE_DIR: &str = "cats/images";

/// A decoded image ready to be written.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// File extension derived from the MIME type
    pub extension: &'static str,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("extension", &self.extension)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Decodes a base64 data URI.
///
/// # Errors
/// Returns a client-facing message for a malformed URI, an unsupported image
/// type, invalid base64 or an empty payload.
pub fn decode_data_uri(data: &str) -> std::result::Result<ImageUpload, String> {
    let Some((header, payload)) = data
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
    else {
        return Err("Upload a valid image. Expected a base64 data URI.".to_string());
    };

    let extension = match header.to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        other => return Err(format!("Unsupported image type: {other}.")),
    };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| "Upload a valid image. The base64 payload is corrupted.".to_string())?;
    if bytes.is_empty() {
        return Err("The submitted file is empty.".to_string());
    }

    Ok(ImageUpload { extension, bytes })
}

/// Writes an upload below `root` and returns its relative path.
pub async fn store(root: &Path, upload: &ImageUpload) -> Result<String> {
    let relative = format!("{IMAGE_DIR}/{}.{}", uuid::Uuid::new_v4().simple(), upload.extension);
    let target = root.join(&relative);
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&target, &upload.bytes).await?;
    debug!("Stored image at {}", target.display());
    Ok(relative)
}

/// Removes a stored image. Failures are logged, not returned.
pub async fn remove(root: &Path, relative: &str) {
    let target = root.join(relative);
    if let Err(e) = tokio::fs::remove_file(&target).await {
        warn!("Failed to remove image {}: {}", target.display(), e);
    }
}

/// URL a stored image is served under, e.g. `/media/cats/images/ab12.png`.
#[must_use]
pub fn media_url(media: &MediaConfig, relative: &str) -> String {
    format!("{}{}", media.url, relative)
}

/// `media_url` prefixed with the public base URL when one is configured.
#[must_use]
pub fn public_url(media: &MediaConfig, relative: &str) -> String {
    let path = media_url(media, relative);
    match &media.public_base_url {
        Some(base) => format!("{}{}", base.trim_end_matches('/'), path),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_decode_png() {
        let upload = decode_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(upload.extension, "png");
        assert_eq!(upload.bytes, b"hello");
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(decode_data_uri("aGVsbG8=").is_err());
        assert!(decode_data_uri("data:text/plain;base64,aGVsbG8=").is_err());
        assert!(decode_data_uri("data:image/png;base64,!!!").is_err());
        assert!(decode_data_uri("data:image/png;base64,").is_err());
    }

    #[test]
    fn test_urls() {
        let mut media = MediaConfig::default();
        assert_eq!(media_url(&media, "cats/images/a.png"), "/media/cats/images/a.png");
        assert_eq!(public_url(&media, "cats/images/a.png"), "/media/cats/images/a.png");

        media.public_base_url = Some("https://kittygram.example/".to_string());
        assert_eq!(
            public_url(&media, "cats/images/a.png"),
            "https://kittygram.example/media/cats/images/a.png"
        );
    }

    #[tokio::test]
    async fn test_store_and_remove() -> Result<()> {
        let root = std::env::temp_dir().join(format!("kittygram-test-{}", uuid::Uuid::new_v4()));
        let upload = decode_data_uri("data:image/gif;base64,aGVsbG8=").unwrap();

        let relative = store(&root, &upload).await?;
        assert!(relative.starts_with(IMAGE_DIR));
        assert!(relative.ends_with(".gif"));
        assert_eq!(tokio::fs::read(root.join(&relative)).await?, b"hello");

        remove(&root, &relative).await;
        assert!(!root.join(&relative).exists());

        tokio::fs::remove_dir_all(&root).await?;
        Ok(())
    }
}
