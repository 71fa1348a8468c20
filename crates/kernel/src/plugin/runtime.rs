//! Plugin runtime.
//!
//! Holds the natively linked plugins together with their parsed manifests.
//! Plugins are registered once at startup; the set never changes afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};
use wordepress_sdk::Plugin;

use super::dependency::resolve_load_order;
use super::error::PluginError;
use super::info_parser::PluginInfo;

/// A registered plugin and its manifest.
pub struct LoadedPlugin {
    /// Plugin metadata from `.info.toml`.
    pub info: PluginInfo,
    pub plugin: Arc<dyn Plugin>,
}

impl LoadedPlugin {
    /// Whether the manifest declares `tap`.
    pub fn implements(&self, tap: &str) -> bool {
        self.info.implements(tap)
    }
}

impl fmt::Debug for LoadedPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedPlugin")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Registered plugins indexed by name.
#[derive(Debug, Default)]
pub struct PluginRuntime {
    plugins: HashMap<String, Arc<LoadedPlugin>>,
    /// Dependency order, computed by [`PluginRuntime::from_plugins`].
    load_order: Vec<String>,
}

impl PluginRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every plugin and check that dependencies resolve.
    pub fn from_plugins(plugins: Vec<Arc<dyn Plugin>>) -> Result<Self, PluginError> {
        let mut runtime = Self::new();
        for plugin in plugins {
            runtime.register(plugin)?;
        }
        runtime.resolve()?;
        info!(count = runtime.plugins.len(), order = ?runtime.load_order, "loaded plugins");
        Ok(runtime)
    }

    /// Register a single plugin from its embedded manifest.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> Result<(), PluginError> {
        let info = PluginInfo::parse_str(plugin.manifest(), "embedded .info.toml")?;
        if self.plugins.contains_key(&info.name) {
            return Err(PluginError::DuplicatePlugin { plugin: info.name });
        }

        debug!(plugin = %info.name, taps = ?info.taps.implements, "registered plugin");
        self.plugins
            .insert(info.name.clone(), Arc::new(LoadedPlugin { info, plugin }));
        Ok(())
    }

    /// Recompute the dependency order of the registered plugins.
    pub fn resolve(&mut self) -> Result<(), PluginError> {
        let infos: HashMap<String, PluginInfo> = self
            .plugins
            .iter()
            .map(|(name, p)| (name.clone(), p.info.clone()))
            .collect();
        self.load_order = resolve_load_order(&infos)?;
        Ok(())
    }

    pub fn get_plugin(&self, name: &str) -> Option<Arc<LoadedPlugin>> {
        self.plugins.get(name).cloned()
    }

    pub fn plugins(&self) -> &HashMap<String, Arc<LoadedPlugin>> {
        &self.plugins
    }

    /// Plugin names, dependencies first.
    pub fn load_order(&self) -> &[String] {
        &self.load_order
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }
}
