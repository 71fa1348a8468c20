//! Images referenced from documents.
//!
//! Uploads are content-addressed: the attachment name is the SHA-256 of the
//! bytes plus the original extension, so unchanged images are never uploaded
//! twice and renamed files share one attachment.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{PublishError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Where the image was read from.
    pub source: PathBuf,
    /// Extension including the leading dot, or empty.
    pub extension: String,
    pub mime_type: String,
    /// Lowercase hex SHA-256 of `content`.
    pub hash: String,
    pub content: Vec<u8>,
}

impl Image {
    /// Read and fingerprint an image file.
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read(path).map_err(|e| PublishError::io(path, e))?;
        Ok(Self::from_bytes(path, content))
    }

    pub fn from_bytes(path: &Path, content: Vec<u8>) -> Self {
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let hash = hex::encode(Sha256::digest(&content));
        let mime_type = detect_mime(&content, &extension).to_string();

        Self {
            source: path.to_path_buf(),
            extension,
            mime_type,
            hash,
            content,
        }
    }

    /// Attachment name on the site.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.hash, self.extension)
    }

    /// Path the rendered HTML refers to.
    pub fn upload_path(&self) -> String {
        format!("/wp-content/uploads/{}", self.file_name())
    }
}

/// Sniff the content, falling back to the extension for text formats.
fn detect_mime(content: &[u8], extension: &str) -> &'static str {
    if let Some(kind) = infer::get(content) {
        return kind.mime_type();
    }
    match extension.to_ascii_lowercase().as_str() {
        ".svg" => "image/svg+xml",
        ".txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H', b'D', b'R',
    ];

    #[test]
    fn png_is_sniffed_and_hashed() {
        let image = Image::from_bytes(Path::new("img/diagram.png"), PNG.to_vec());
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.extension, ".png");
        assert_eq!(image.hash.len(), 64);
        assert_eq!(image.file_name(), format!("{}.png", image.hash));
        assert_eq!(
            image.upload_path(),
            format!("/wp-content/uploads/{}.png", image.hash)
        );
    }

    #[test]
    fn identical_bytes_share_a_name() {
        let a = Image::from_bytes(Path::new("a.svg"), b"<svg/>".to_vec());
        let b = Image::from_bytes(Path::new("sub/b.svg"), b"<svg/>".to_vec());
        assert_eq!(a.file_name(), b.file_name());
        assert_eq!(a.mime_type, "image/svg+xml");
    }

    #[test]
    fn unknown_content_without_extension() {
        let image = Image::from_bytes(Path::new("blob"), vec![1, 2, 3]);
        assert_eq!(image.extension, "");
        assert_eq!(image.mime_type, "application/octet-stream");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Image::read(Path::new("/nonexistent/x.png")).unwrap_err();
        assert!(matches!(err, PublishError::Io { .. }));
    }
}
