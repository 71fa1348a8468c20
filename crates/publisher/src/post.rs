//! Local and remote views of a published post.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Value, json};

/// A post built from a markdown file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPost {
    pub source: PathBuf,
    /// Index of the parent within the loaded site, if nested.
    pub parent: Option<usize>,
    pub title: String,
    pub content: String,
    pub menu_order: i64,
    pub slug: String,
    pub product: String,
    pub version: String,
    /// File stem the slug was built from.
    pub name: String,
    pub tag: String,
}

impl LocalPost {
    /// Request body for create and update calls.
    pub fn to_json(&self, parent_id: u64) -> Value {
        json!({
            "title": { "raw": self.title },
            "content": { "raw": self.content },
            "parent": parent_id,
            "menu_order": self.menu_order,
            "slug": self.slug,
            "status": "publish",
            "wpcf-product": self.product,
            "wpcf-version": self.version,
            "wpcf-name": self.name,
            "wpcf-tag": self.tag,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Text {
    #[serde(default)]
    pub raw: String,
    #[serde(default)]
    pub rendered: String,
}

/// A post as listed by the site in edit context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemotePost {
    pub id: u64,
    pub slug: String,
    #[serde(default)]
    pub parent: u64,
    #[serde(default)]
    pub menu_order: i64,
    #[serde(default)]
    pub title: Text,
    #[serde(default)]
    pub content: Text,
    #[serde(default, rename = "wpcf-product")]
    pub product: String,
    #[serde(default, rename = "wpcf-version")]
    pub version: String,
    #[serde(default, rename = "wpcf-name")]
    pub name: String,
    #[serde(default, rename = "wpcf-tag")]
    pub tag: String,
}
