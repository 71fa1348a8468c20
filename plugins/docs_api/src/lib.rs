//! Documentation API plugin for wordepress.
//!
//! Exposes the `documentation` and `tutorials` post types over REST, attaches
//! their `wpcf-*` metadata fields, permits `meta_query` as a list filter and
//! installs the `docs/...` front-end URLs on activation.

use tracing::debug;
use wordepress_sdk::prelude::*;

/// Post type holding product documentation.
pub const DOCUMENTATION: &str = "documentation";

/// Post type holding tutorials.
pub const TUTORIALS: &str = "tutorials";

/// Metadata fields attached to each post type.
pub const FIELDS: &[(&str, &[&str])] = &[
    (
        DOCUMENTATION,
        &["wpcf-product", "wpcf-version", "wpcf-name", "wpcf-tag"],
    ),
    (TUTORIALS, &["wpcf-name"]),
];

/// `docs/{product}/{version}/{page}/{child}`, matched before the three-segment form.
pub const NESTED_DOC_REGEX: &str = "docs/([^/]+)/([^/]+)/([^/]+)/([^/]+)";
pub const NESTED_DOC_QUERY: &str = "index.php?post_type=documentation&pagename= $matches[1]-$matches[2]-$matches[3]/$matches[1]-$matches[2]-$matches[4]";

/// `docs/{product}/{version}/{page}`.
pub const DOC_REGEX: &str = "docs/([^/]+)/([^/]+)/([^/]+)";
pub const DOC_QUERY: &str =
    "index.php?post_type=documentation&pagename= $matches[1]-$matches[2]-$matches[3]";

/// The plugin.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocsApiPlugin;

impl Plugin for DocsApiPlugin {
    fn manifest(&self) -> &'static str {
        include_str!("../docs_api.info.toml")
    }

    fn tap_init(&self, types: &dyn PostTypes) {
        for post_type in [DOCUMENTATION, TUTORIALS] {
            if !types.configure_rest(post_type, RestExposure::posts(post_type)) {
                debug!(post_type, "post type not registered, REST exposure skipped");
            }
        }
    }

    fn tap_rest_api_init(&self, fields: &dyn RestFields) {
        for (post_type, names) in FIELDS {
            for name in *names {
                fields.register_rest_field(
                    RestFieldDefinition::new(*post_type, *name)
                        .get_callback(document_get_meta)
                        .update_callback(document_update_meta)
                        .schema(serde_json::json!({ "type": "string" })),
                );
            }
        }
    }

    fn tap_rest_query_vars(&self, mut valid_vars: Vec<String>) -> Vec<String> {
        valid_vars.push("meta_query".to_string());
        valid_vars
    }

    fn tap_activate(&self, rewrites: &mut dyn Rewrites) {
        rewrites.add_rewrite_rule(NESTED_DOC_REGEX, NESTED_DOC_QUERY, RewritePosition::Top);
        rewrites.add_rewrite_rule(DOC_REGEX, DOC_QUERY, RewritePosition::Top);
        rewrites.flush_rewrite_rules();
    }

    fn tap_deactivate(&self, rewrites: &mut dyn Rewrites) {
        rewrites.flush_rewrite_rules();
    }
}

/// Read accessor: the stored value, or an empty string when unset.
pub fn document_get_meta(post: &dyn PostMeta, field_name: &str) -> Value {
    Value::String(post.get_meta(field_name).unwrap_or_default())
}

/// Write accessor.
///
/// Falsy and non-string values are ignored (`None`). Strings are stored with
/// markup tags stripped; the result reports whether the stored value changed.
pub fn document_update_meta(value: &Value, post: &mut dyn PostMeta, field_name: &str) -> Option<bool> {
    if is_falsy(value) {
        return None;
    }
    let text = value.as_str()?;
    Some(post.update_meta(field_name, &strip_tags(text)))
}
