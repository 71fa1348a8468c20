//! Wordepress test utilities.
//!
//! Helpers for integration testing: REST request bodies, Basic credentials,
//! markdown source trees on disk, and JSON assertions.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value as JsonValue, json};

/// User the test kernels accept.
pub const TEST_USER: &str = "admin";

/// Password the test kernels accept.
pub const TEST_PASSWORD: &str = "test-password";

/// `Authorization` header value for the test credentials.
pub fn basic_auth() -> String {
    basic_auth_for(TEST_USER, TEST_PASSWORD)
}

/// `Authorization` header value for arbitrary credentials.
pub fn basic_auth_for(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

/// Create a test document with default values.
pub fn test_doc(title: &str) -> TestDoc {
    TestDoc {
        title: title.to_string(),
        content: String::new(),
        slug: None,
        status: "publish".to_string(),
        parent: 0,
        menu_order: 0,
        meta: Map::new(),
    }
}

/// A builder for REST create/update bodies.
#[derive(Debug, Clone)]
pub struct TestDoc {
    pub title: String,
    pub content: String,
    pub slug: Option<String>,
    pub status: String,
    pub parent: u64,
    pub menu_order: i64,
    pub meta: Map<String, JsonValue>,
}

impl TestDoc {
    pub fn with_content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    pub fn with_slug(mut self, slug: &str) -> Self {
        self.slug = Some(slug.to_string());
        self
    }

    pub fn with_parent(mut self, parent: u64) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_menu_order(mut self, menu_order: i64) -> Self {
        self.menu_order = menu_order;
        self
    }

    /// Set as draft.
    pub fn draft(mut self) -> Self {
        self.status = "draft".to_string();
        self
    }

    /// Add a metadata field to the body.
    pub fn with_meta(mut self, key: &str, value: JsonValue) -> Self {
        self.meta.insert(key.to_string(), value);
        self
    }

    /// Set the four documentation fields at once.
    pub fn documentation(self, product: &str, version: &str, name: &str, tag: &str) -> Self {
        self.with_meta("wpcf-product", json!(product))
            .with_meta("wpcf-version", json!(version))
            .with_meta("wpcf-name", json!(name))
            .with_meta("wpcf-tag", json!(tag))
    }

    /// Render as a JSON request body.
    pub fn to_json(&self) -> JsonValue {
        let mut body = json!({
            "title": { "raw": self.title },
            "content": { "raw": self.content },
            "status": self.status,
            "parent": self.parent,
            "menu_order": self.menu_order,
        });
        if let Some(slug) = &self.slug {
            body["slug"] = json!(slug);
        }
        if let JsonValue::Object(map) = &mut body {
            map.extend(self.meta.clone());
        }
        body
    }
}

/// A markdown source tree in a temporary directory.
///
/// Dropping the tree removes the directory.
pub struct SourceTree {
    dir: tempfile::TempDir,
}

impl SourceTree {
    /// Create an empty tree.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the tree root, creating parent directories.
    ///
    /// # Panics
    ///
    /// Panics on I/O errors.
    #[allow(clippy::expect_used)]
    pub fn file(&self, relative: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create directories");
        }
        fs::write(&path, content).expect("failed to write file");
        path
    }

    /// Write a markdown document with a header block.
    pub fn doc(&self, relative: &str, title: &str, menu_order: Option<i64>, body: &str) -> PathBuf {
        let mut header = format!("---\ntitle: {title}\n");
        if let Some(order) = menu_order {
            header.push_str(&format!("menu_order: {order}\n"));
        }
        header.push_str("---\n");
        self.file(relative, format!("{header}{body}"))
    }
}

impl Default for SourceTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Assertion helpers for JSON content.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a JSON string field has the expected value.
    pub fn str_field(value: &Value, key: &str, expected: &str) {
        assert_eq!(
            value.get(key).and_then(Value::as_str),
            Some(expected),
            "field '{key}' mismatch in {value}"
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }
}
