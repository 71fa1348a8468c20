//! Wordepress Plugin SDK
//!
//! Types and traits shared between the Wordepress kernel and its plugins.
//! Plugins implement [`Plugin`] and receive typed handles to the kernel's
//! post type, REST field and rewrite registries during each tap.

pub mod plugin;
pub mod text;
pub mod types;

pub use plugin::{Plugin, PostTypes, RestFields, Rewrites};

// Re-export serde_json so plugins share the kernel's JSON value type
#[doc(hidden)]
pub use serde_json;

pub mod prelude {
    pub use crate::plugin::{Plugin, PostTypes, RestFields, Rewrites, taps};
    pub use crate::text::strip_tags;
    pub use crate::types::*;
    pub use serde_json::Value;
}
