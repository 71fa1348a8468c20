//! Core types for Wordepress plugins.
//!
//! These types cross the kernel/plugin boundary: post type descriptors,
//! REST field definitions with their accessor callbacks, and rewrite rules.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// REST controller serving a post type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestController {
    /// The kernel's generic posts controller.
    #[default]
    Posts,
}

/// REST exposure settings of a post type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestExposure {
    /// Whether the post type is routable under `/wp-json/wp/v2/`.
    pub show_in_rest: bool,
    /// Path segment the type is served under.
    pub rest_base: String,
    /// Controller handling requests for the type.
    pub rest_controller: RestController,
}

impl RestExposure {
    /// Expose a post type through the generic posts controller.
    pub fn posts(rest_base: impl Into<String>) -> Self {
        Self {
            show_in_rest: true,
            rest_base: rest_base.into(),
            rest_controller: RestController::Posts,
        }
    }
}

/// A post type descriptor registered with the kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostTypeDefinition {
    pub machine_name: String,
    pub label: String,
    /// Hierarchical types resolve page paths through their parent chain.
    #[serde(default)]
    pub hierarchical: bool,
    /// Front-end URL prefix. `None` disables the generated rewrite rule.
    #[serde(default)]
    pub rewrite_slug: Option<String>,
    #[serde(default)]
    pub rest: RestExposure,
}

impl PostTypeDefinition {
    /// A hierarchical post type, rewritten under its own name and hidden from REST.
    pub fn new(machine_name: impl Into<String>) -> Self {
        let machine_name = machine_name.into();
        Self {
            label: machine_name.clone(),
            rewrite_slug: Some(machine_name.clone()),
            machine_name,
            hierarchical: true,
            rest: RestExposure::default(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn hierarchical(mut self, hierarchical: bool) -> Self {
        self.hierarchical = hierarchical;
        self
    }

    pub fn rewrite_slug(mut self, slug: Option<&str>) -> Self {
        self.rewrite_slug = slug.map(str::to_string);
        self
    }
}

/// Where a rewrite rule sits relative to the kernel's generated rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewritePosition {
    /// Evaluated before every generated rule.
    Top,
    /// Evaluated after every generated rule.
    Bottom,
}

/// A rewrite rule mapping a front-end path pattern to an internal query.
///
/// `query` may reference capture groups as `$matches[n]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub regex: String,
    pub query: String,
    pub position: RewritePosition,
}

impl RewriteRule {
    pub fn new(regex: impl Into<String>, query: impl Into<String>, position: RewritePosition) -> Self {
        Self {
            regex: regex.into(),
            query: query.into(),
            position,
        }
    }
}

/// Metadata access handed to REST field accessors.
///
/// The kernel implements this for the post being read or written.
pub trait PostMeta {
    /// Identifier of the post.
    fn post_id(&self) -> u64;

    /// Post type machine name.
    fn post_type(&self) -> &str;

    /// Current value of a metadata key.
    fn get_meta(&self, key: &str) -> Option<String>;

    /// Store a metadata value. Returns `true` when the stored value changed.
    fn update_meta(&mut self, key: &str, value: &str) -> bool;
}

/// Read accessor: `(post, field_name) -> value`.
pub type FieldGetter = fn(&dyn PostMeta, &str) -> Value;

/// Write accessor: `(value, post, field_name) -> persistence result`.
///
/// `None` means the value was ignored.
pub type FieldUpdater = fn(&Value, &mut dyn PostMeta, &str) -> Option<bool>;

/// A REST field attached to every item of a post type.
#[derive(Debug, Clone)]
pub struct RestFieldDefinition {
    pub post_type: String,
    pub field_name: String,
    pub get_callback: Option<FieldGetter>,
    pub update_callback: Option<FieldUpdater>,
    /// JSON schema advertised for the field, if any.
    pub schema: Option<Value>,
}

impl RestFieldDefinition {
    pub fn new(post_type: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            post_type: post_type.into(),
            field_name: field_name.into(),
            get_callback: None,
            update_callback: None,
            schema: None,
        }
    }

    pub fn get_callback(mut self, callback: FieldGetter) -> Self {
        self.get_callback = Some(callback);
        self
    }

    pub fn update_callback(mut self, callback: FieldUpdater) -> Self {
        self.update_callback = Some(callback);
        self
    }

    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// Whether a request value counts as false.
///
/// Null, `false`, zero, `""`, `"0"` and empty arrays or objects are falsy.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
