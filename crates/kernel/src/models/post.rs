//! Post model.
//!
//! Posts are the content records served by the REST controller. Every post
//! belongs to a registered post type and carries free-form string metadata
//! that plugins expose through REST fields.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wordepress_sdk::types::PostMeta;

/// Publication status of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Publish,
    Draft,
    Pending,
    Private,
    Trash,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Publish => "publish",
            PostStatus::Draft => "draft",
            PostStatus::Pending => "pending",
            PostStatus::Private => "private",
            PostStatus::Trash => "trash",
        }
    }

    /// Whether anonymous readers may see posts in this status.
    pub fn is_public(&self) -> bool {
        matches!(self, PostStatus::Publish)
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publish" => Ok(PostStatus::Publish),
            "draft" => Ok(PostStatus::Draft),
            "pending" => Ok(PostStatus::Pending),
            "private" => Ok(PostStatus::Private),
            "trash" => Ok(PostStatus::Trash),
            other => Err(format!("invalid post status '{other}'")),
        }
    }
}

/// A stored post.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// Unique identifier, assigned by the store starting at 1.
    pub id: u64,

    /// Post type machine name.
    pub post_type: String,

    /// URL slug, unique among siblings of the same type.
    pub slug: String,

    pub title: String,

    pub content: String,

    pub status: PostStatus,

    /// Parent post id (0 = top level).
    pub parent: u64,

    pub menu_order: i64,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,

    /// Metadata values keyed by meta key.
    pub meta: BTreeMap<String, String>,
}

impl PostMeta for Post {
    fn post_id(&self) -> u64 {
        self.id
    }

    fn post_type(&self) -> &str {
        &self.post_type
    }

    fn get_meta(&self, key: &str) -> Option<String> {
        self.meta.get(key).cloned()
    }

    fn update_meta(&mut self, key: &str, value: &str) -> bool {
        if self.meta.get(key).is_some_and(|v| v == value) {
            return false;
        }
        self.meta.insert(key.to_string(), value.to_string());
        true
    }
}

/// Input for creating a post.
#[derive(Debug, Clone, Default)]
pub struct CreatePost {
    pub post_type: String,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    /// Requested slug. Derived from the title when absent.
    pub slug: Option<String>,
    pub parent: u64,
    pub menu_order: i64,
}

/// Input for a partial post update. `None` leaves the value unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<PostStatus>,
    pub slug: Option<String>,
    pub parent: Option<u64>,
    pub menu_order: Option<i64>,
}

impl UpdatePost {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.status.is_none()
            && self.slug.is_none()
            && self.parent.is_none()
            && self.menu_order.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample() -> Post {
        let now = Utc::now();
        Post {
            id: 7,
            post_type: "documentation".to_string(),
            slug: "intro".to_string(),
            title: "Intro".to_string(),
            content: String::new(),
            status: PostStatus::Publish,
            parent: 0,
            menu_order: 0,
            created: now,
            modified: now,
            meta: BTreeMap::new(),
        }
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            PostStatus::Publish,
            PostStatus::Draft,
            PostStatus::Pending,
            PostStatus::Private,
            PostStatus::Trash,
        ] {
            assert_eq!(status.as_str().parse::<PostStatus>().unwrap(), status);
        }
        assert!("published".parse::<PostStatus>().is_err());
    }

    #[test]
    fn update_meta_reports_change() {
        let mut post = sample();
        assert!(post.update_meta("wpcf-tag", "v1"));
        assert!(!post.update_meta("wpcf-tag", "v1"));
        assert!(post.update_meta("wpcf-tag", "v2"));
        assert_eq!(post.get_meta("wpcf-tag").as_deref(), Some("v2"));
    }

    #[test]
    fn empty_update_detected() {
        assert!(UpdatePost::default().is_empty());
        let update = UpdatePost {
            menu_order: Some(3),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
