//! Media attachment model.

use axum::body::Bytes;
use chrono::{DateTime, Utc};

/// An uploaded attachment, served under `/wp-content/uploads/{file}`.
#[derive(Debug, Clone)]
pub struct Media {
    pub id: u64,
    /// Stored file name, unique across all attachments.
    pub file: String,
    pub mime_type: String,
    /// Hex SHA-256 of the content, used as the ETag.
    pub sha256: String,
    pub bytes: Bytes,
    pub created: DateTime<Utc>,
}
