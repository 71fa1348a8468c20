//! Post type registry.
//!
//! Holds the post type descriptors registered by the kernel at startup and
//! lets plugins adjust their REST exposure during `tap_init`.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info};
use wordepress_sdk::PostTypes;
use wordepress_sdk::types::{PostTypeDefinition, RestExposure};

/// Registry of post types.
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone, Default)]
pub struct PostTypeRegistry {
    types: Arc<DashMap<String, PostTypeDefinition>>,
}

impl PostTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a post type, replacing any type with the same machine name.
    pub fn register(&self, def: PostTypeDefinition) {
        info!(post_type = %def.machine_name, "registered post type");
        self.types.insert(def.machine_name.clone(), def);
    }

    /// Get a post type by machine name.
    pub fn get(&self, name: &str) -> Option<PostTypeDefinition> {
        self.types.get(name).map(|r| r.clone())
    }

    /// Post types routable under the REST API, sorted by machine name.
    pub fn rest_visible(&self) -> Vec<PostTypeDefinition> {
        let mut visible: Vec<_> = self
            .types
            .iter()
            .filter(|r| r.rest.show_in_rest)
            .map(|r| r.value().clone())
            .collect();
        visible.sort_by(|a, b| a.machine_name.cmp(&b.machine_name));
        visible
    }

    /// Find the REST-visible post type served under `rest_base`.
    pub fn find_by_rest_base(&self, rest_base: &str) -> Option<PostTypeDefinition> {
        self.types
            .iter()
            .find(|r| r.rest.show_in_rest && r.rest.rest_base == rest_base)
            .map(|r| r.value().clone())
    }

    /// All registered post types, sorted by machine name.
    pub fn list(&self) -> Vec<PostTypeDefinition> {
        let mut all: Vec<_> = self.types.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| a.machine_name.cmp(&b.machine_name));
        all
    }

    pub fn type_names(&self) -> Vec<String> {
        self.list().into_iter().map(|t| t.machine_name).collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl PostTypes for PostTypeRegistry {
    fn configure_rest(&self, post_type: &str, exposure: RestExposure) -> bool {
        match self.types.get_mut(post_type) {
            Some(mut def) => {
                info!(
                    post_type = %post_type,
                    rest_base = %exposure.rest_base,
                    "post type exposed over REST"
                );
                def.rest = exposure;
                true
            }
            None => {
                debug!(post_type = %post_type, "configure_rest on unregistered post type ignored");
                false
            }
        }
    }

    fn exists(&self, post_type: &str) -> bool {
        self.types.contains_key(post_type)
    }
}
