//! Tap dispatcher - invokes plugin taps in weight order.
//!
//! A panicking plugin is logged and skipped, allowing the others to continue.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::{debug, error};
use wordepress_sdk::plugin::taps;
use wordepress_sdk::{PostTypes, RestFields, Rewrites};

use super::{TapHandler, TapRegistry};
use crate::plugin::LoadedPlugin;

/// Dispatcher for invoking taps across plugins.
pub struct TapDispatcher {
    registry: Arc<TapRegistry>,
}

impl TapDispatcher {
    pub fn new(registry: Arc<TapRegistry>) -> Self {
        Self { registry }
    }

    /// The tap registry, for handler introspection.
    pub fn registry(&self) -> &TapRegistry {
        &self.registry
    }

    /// Run `tap_init` on every implementing plugin.
    pub fn init(&self, types: &dyn PostTypes) {
        self.each(taps::INIT, |handler| handler.plugin.plugin.tap_init(types));
    }

    /// Run `tap_rest_api_init` on every implementing plugin.
    pub fn rest_api_init(&self, fields: &dyn RestFields) {
        self.each(taps::REST_API_INIT, |handler| {
            handler.plugin.plugin.tap_rest_api_init(fields);
        });
    }

    /// Fold the permitted REST query vars through every implementing plugin.
    ///
    /// A plugin that panics leaves the list as it received it.
    pub fn rest_query_vars(&self, vars: Vec<String>) -> Vec<String> {
        self.registry
            .get_handlers(taps::REST_QUERY_VARS)
            .iter()
            .fold(vars, |vars, handler| {
                let input = vars.clone();
                guarded(&handler.plugin, taps::REST_QUERY_VARS, || {
                    handler.plugin.plugin.tap_rest_query_vars(input)
                })
                .unwrap_or(vars)
            })
    }

    fn each(&self, tap_name: &str, call: impl Fn(&TapHandler)) {
        let handlers = self.registry.get_handlers(tap_name);
        for handler in handlers {
            guarded(&handler.plugin, tap_name, || call(handler));
        }
        debug!(tap = %tap_name, handlers = handlers.len(), "dispatch complete");
    }
}

/// Run `tap_activate` on a single plugin, if its manifest declares it.
pub fn activate(plugin: &LoadedPlugin, rewrites: &mut dyn Rewrites) {
    if plugin.implements(taps::ACTIVATE) {
        guarded(plugin, taps::ACTIVATE, || plugin.plugin.tap_activate(rewrites));
    }
}

/// Run `tap_deactivate` on a single plugin, if its manifest declares it.
pub fn deactivate(plugin: &LoadedPlugin, rewrites: &mut dyn Rewrites) {
    if plugin.implements(taps::DEACTIVATE) {
        guarded(plugin, taps::DEACTIVATE, || plugin.plugin.tap_deactivate(rewrites));
    }
}

fn guarded<R>(plugin: &LoadedPlugin, tap: &str, call: impl FnOnce() -> R) -> Option<R> {
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => Some(result),
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_default();
            error!(
                plugin = %plugin.info.name,
                tap = %tap,
                message = %message,
                "tap panicked"
            );
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::plugin::PluginRuntime;
    use wordepress_sdk::Plugin;

    struct AddsVar;

    impl Plugin for AddsVar {
        fn manifest(&self) -> &'static str {
            r#"
name = "adds_var"
description = "Adds a query var"
version = "1.0.0"
[taps]
implements = ["tap_rest_query_vars"]
"#
        }

        fn tap_rest_query_vars(&self, mut vars: Vec<String>) -> Vec<String> {
            vars.push("extra".to_string());
            vars
        }
    }

    struct Panics;

    impl Plugin for Panics {
        fn manifest(&self) -> &'static str {
            r#"
name = "panics"
description = "Always panics"
version = "1.0.0"
[taps]
implements = ["tap_rest_query_vars"]
weight = 10
"#
        }

        fn tap_rest_query_vars(&self, _vars: Vec<String>) -> Vec<String> {
            panic!("broken plugin");
        }
    }

    struct Undeclared;

    impl Plugin for Undeclared {
        fn manifest(&self) -> &'static str {
            "name = \"undeclared\"\ndescription = \"No taps\"\nversion = \"1.0.0\"\n"
        }

        fn tap_rest_query_vars(&self, _vars: Vec<String>) -> Vec<String> {
            Vec::new()
        }
    }

    fn dispatcher(plugins: Vec<Arc<dyn Plugin>>) -> TapDispatcher {
        let runtime = PluginRuntime::from_plugins(plugins).unwrap();
        TapDispatcher::new(Arc::new(TapRegistry::from_plugins(&runtime)))
    }

    #[test]
    fn query_vars_fold_skips_panicking_plugin() {
        let dispatcher = dispatcher(vec![Arc::new(AddsVar) as Arc<dyn Plugin>, Arc::new(Panics)]);
        let vars = dispatcher.rest_query_vars(vec!["name".to_string()]);
        assert_eq!(vars, vec!["name", "extra"]);
    }

    #[test]
    fn undeclared_taps_are_not_called() {
        let dispatcher = dispatcher(vec![Arc::new(Undeclared) as Arc<dyn Plugin>]);
        let vars = dispatcher.rest_query_vars(vec!["name".to_string()]);
        assert_eq!(vars, vec!["name"]);
    }
}
