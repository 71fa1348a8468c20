//! Media attachments.
//!
//! Uploaded files keep their requested name when it is free; otherwise
//! `-1`, `-2`, ... is inserted before the extension.

use std::sync::Arc;

use axum::body::Bytes;
use chrono::Utc;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::Media;
use crate::store::PostStore;

const OCTET_STREAM: &str = "application/octet-stream";

/// Service for media uploads.
pub struct MediaService {
    store: Arc<dyn PostStore>,
    write_lock: Mutex<()>,
}

impl MediaService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Store an upload.
    ///
    /// The MIME type comes from `content_type` unless it is absent or generic,
    /// in which case it is sniffed from the content.
    pub fn upload(&self, filename: &str, content_type: Option<&str>, bytes: Bytes) -> AppResult<Media> {
        if bytes.is_empty() {
            return Err(AppError::bad_request("rest_upload_no_data", "No data supplied."));
        }
        let requested = sanitize_filename(filename);
        if requested.is_empty() {
            return Err(AppError::bad_request(
                "rest_upload_invalid_disposition",
                "Invalid Content-Disposition supplied.",
            ));
        }

        let mime_type = content_type
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim())
            .filter(|ct| !ct.is_empty() && *ct != OCTET_STREAM)
            .map(str::to_string)
            .or_else(|| infer::get(&bytes).map(|kind| kind.mime_type().to_string()))
            .unwrap_or_else(|| OCTET_STREAM.to_string());
        let sha256 = hex::encode(Sha256::digest(&bytes));

        let _guard = self.write_lock.lock();
        let file = self.unique_filename(&requested);
        let media = self.store.insert_media(Media {
            id: 0,
            file,
            mime_type,
            sha256,
            bytes,
            created: Utc::now(),
        });

        info!(
            id = media.id,
            file = %media.file,
            mime_type = %media.mime_type,
            size = media.bytes.len(),
            "media uploaded"
        );
        Ok(media)
    }

    pub fn get(&self, file: &str) -> Option<Media> {
        self.store.media_by_file(file)
    }

    fn unique_filename(&self, requested: &str) -> String {
        if self.store.media_by_file(requested).is_none() {
            return requested.to_string();
        }
        let (stem, ext) = match requested.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{ext}")),
            _ => (requested, String::new()),
        };
        (1u32..)
            .map(|n| format!("{stem}-{n}{ext}"))
            .find(|candidate| self.store.media_by_file(candidate).is_none())
            .unwrap_or_else(|| requested.to_string())
    }
}

/// Reduce an uploaded name to a safe base name.
///
/// Directory components are dropped; characters outside `[A-Za-z0-9._-]`
/// become dashes.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    cleaned.trim_matches(['.', '-']).to_string()
}

/// Extract the filename from a `Content-Disposition` header value.
pub fn disposition_filename(header: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("filename")
            .then(|| value.trim().trim_matches('"').to_string())
            .filter(|v| !v.is_empty())
    })
}
