//! The plugin trait and the kernel handles passed to each tap.
//!
//! Taps are named extension points. A plugin lists the taps it implements in
//! its `.info.toml` manifest; the kernel only calls those, in weight order.

use crate::types::{RestExposure, RestFieldDefinition, RewritePosition};

/// Tap names understood by the kernel.
pub mod taps {
    /// Post type setup, after the kernel registered its own types.
    pub const INIT: &str = "tap_init";
    /// REST field registration, after every `tap_init`.
    pub const REST_API_INIT: &str = "tap_rest_api_init";
    /// Filter over the permitted REST query vars, per list request.
    pub const REST_QUERY_VARS: &str = "tap_rest_query_vars";
    /// Plugin activation.
    pub const ACTIVATE: &str = "tap_activate";
    /// Plugin deactivation.
    pub const DEACTIVATE: &str = "tap_deactivate";
}

/// Post type registry handle.
pub trait PostTypes {
    /// Set the REST exposure of a registered post type.
    ///
    /// Returns `false`, changing nothing, when the type is not registered.
    fn configure_rest(&self, post_type: &str, exposure: RestExposure) -> bool;

    /// Whether a post type is registered.
    fn exists(&self, post_type: &str) -> bool;
}

/// REST field registry handle.
pub trait RestFields {
    /// Attach a field to a post type's REST representation.
    fn register_rest_field(&self, field: RestFieldDefinition);
}

/// Rewrite rule handle, scoped to a single lifecycle event.
///
/// Rules added here only become active when [`Rewrites::flush_rewrite_rules`]
/// runs during the same event; later flushes rebuild the rule set without them.
pub trait Rewrites {
    fn add_rewrite_rule(&mut self, regex: &str, query: &str, position: RewritePosition);

    /// Recompile and persist the active rule set. Expensive.
    fn flush_rewrite_rules(&mut self);
}

/// A natively linked Wordepress plugin.
///
/// Every tap has a no-op default; the manifest decides which ones run.
pub trait Plugin: Send + Sync {
    /// Contents of the plugin's `.info.toml` manifest.
    fn manifest(&self) -> &'static str;

    fn tap_init(&self, _types: &dyn PostTypes) {}

    fn tap_rest_api_init(&self, _fields: &dyn RestFields) {}

    fn tap_rest_query_vars(&self, valid_vars: Vec<String>) -> Vec<String> {
        valid_vars
    }

    fn tap_activate(&self, _rewrites: &mut dyn Rewrites) {}

    fn tap_deactivate(&self, _rewrites: &mut dyn Rewrites) {}
}
