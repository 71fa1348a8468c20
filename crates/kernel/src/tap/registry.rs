//! Tap registry - indexes which plugins implement which taps.
//!
//! The registry maps tap names to an ordered list of plugins that implement them.
//! Plugins are sorted by weight (lower = called first), then by name.

use std::collections::HashMap;
use std::sync::Arc;

use crate::plugin::{LoadedPlugin, PluginRuntime};

/// A registered tap handler with plugin reference and priority.
#[derive(Debug, Clone)]
pub struct TapHandler {
    /// The plugin that implements this tap.
    pub plugin: Arc<LoadedPlugin>,
    /// Weight for ordering (lower = higher priority).
    pub weight: i32,
}

/// Registry mapping tap names to ordered handlers.
#[derive(Debug, Default)]
pub struct TapRegistry {
    handlers: HashMap<String, Vec<TapHandler>>,
}

impl TapRegistry {
    /// Build a tap registry from the registered plugins.
    pub fn from_plugins(runtime: &PluginRuntime) -> Self {
        let mut handlers: HashMap<String, Vec<TapHandler>> = HashMap::new();

        for plugin in runtime.plugins().values() {
            let weight = plugin.info.taps.weight;

            for tap_name in &plugin.info.taps.implements {
                handlers.entry(tap_name.clone()).or_default().push(TapHandler {
                    plugin: Arc::clone(plugin),
                    weight,
                });
            }
        }

        for list in handlers.values_mut() {
            list.sort_by(|a, b| {
                a.weight
                    .cmp(&b.weight)
                    .then_with(|| a.plugin.info.name.cmp(&b.plugin.info.name))
            });
        }

        Self { handlers }
    }

    /// Handlers for a tap, in weight order. Empty if no plugin implements it.
    pub fn get_handlers(&self, tap_name: &str) -> &[TapHandler] {
        self.handlers.get(tap_name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_tap(&self, tap_name: &str) -> bool {
        !self.get_handlers(tap_name).is_empty()
    }

    pub fn handler_count(&self, tap_name: &str) -> usize {
        self.get_handlers(tap_name).len()
    }

    /// Number of taps with at least one handler.
    pub fn tap_count(&self) -> usize {
        self.handlers.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wordepress_sdk::Plugin;

    struct Manifest(&'static str);

    impl Plugin for Manifest {
        fn manifest(&self) -> &'static str {
            self.0
        }
    }

    fn runtime(manifests: &[&'static str]) -> PluginRuntime {
        let plugins = manifests
            .iter()
            .map(|m| Arc::new(Manifest(*m)) as Arc<dyn Plugin>)
            .collect();
        PluginRuntime::from_plugins(plugins).unwrap()
    }

    const HEAVY: &str = r#"
name = "heavy"
description = "Runs last"
version = "1.0.0"
[taps]
implements = ["tap_init", "tap_rest_query_vars"]
weight = 50
"#;

    const LIGHT: &str = r#"
name = "light"
description = "Runs first"
version = "1.0.0"
[taps]
implements = ["tap_init"]
weight = -5
"#;

    #[test]
    fn registry_from_empty_runtime() {
        let registry = TapRegistry::from_plugins(&PluginRuntime::new());
        assert_eq!(registry.tap_count(), 0);
        assert!(!registry.has_tap("tap_init"));
        assert!(registry.get_handlers("tap_init").is_empty());
    }

    #[test]
    fn handlers_ordered_by_weight() {
        let registry = TapRegistry::from_plugins(&runtime(&[HEAVY, LIGHT]));

        let names: Vec<_> = registry
            .get_handlers("tap_init")
            .iter()
            .map(|h| h.plugin.info.name.as_str())
            .collect();
        assert_eq!(names, vec!["light", "heavy"]);
        assert_eq!(registry.handler_count("tap_rest_query_vars"), 1);
        assert_eq!(registry.tap_count(), 2);
    }
}
