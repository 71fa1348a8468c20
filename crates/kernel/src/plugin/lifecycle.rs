//! Plugin activation and deactivation.
//!
//! Activation runs the plugin's `tap_activate` against a fresh rewrite
//! batch; deactivation runs `tap_deactivate`. Both are serialised by a
//! mutex and idempotent: repeating one returns the current state without
//! invoking the plugin again.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

use super::dependency::check_dependencies;
use super::error::PluginError;
use super::runtime::PluginRuntime;
use super::status::PluginStatus;
use crate::rewrite::RewriteEngine;
use crate::tap;

/// Whether a plugin is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginState {
    Active,
    Inactive,
}

/// A plugin as listed by the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct PluginSummary {
    pub name: String,
    pub description: String,
    pub version: String,
    pub dependencies: Vec<String>,
    pub status: PluginState,
}

/// Activation lifecycle over the registered plugins.
pub struct PluginLifecycle {
    runtime: Arc<PluginRuntime>,
    rewrites: RewriteEngine,
    state_file: Option<PathBuf>,
    status: Mutex<PluginStatus>,
}

impl PluginLifecycle {
    pub fn new(runtime: Arc<PluginRuntime>, rewrites: RewriteEngine, state_file: Option<PathBuf>) -> Self {
        Self {
            runtime,
            rewrites,
            state_file,
            status: Mutex::new(PluginStatus::default()),
        }
    }

    /// Load the state file, if configured, and reinstall its rewrite rules.
    ///
    /// Active plugins that are no longer registered are dropped. Returns
    /// whether a saved status was found.
    pub fn restore(&self) -> anyhow::Result<bool> {
        let Some(path) = &self.state_file else {
            return Ok(false);
        };
        let Some(mut saved) = PluginStatus::load(path)? else {
            info!(path = %path.display(), "no saved plugin status");
            return Ok(false);
        };

        saved.active_plugins.retain(|name| {
            let known = self.runtime.get_plugin(name).is_some();
            if !known {
                warn!(plugin = %name, "saved active plugin is not registered");
            }
            known
        });
        if let Some(rules) = &saved.rewrite_rules {
            self.rewrites.install(rules.clone());
        }

        info!(
            active = ?saved.active_plugins,
            rules = saved.rewrite_rules.as_ref().map_or(0, Vec::len),
            "restored plugin status"
        );
        *self.status.lock() = saved;
        Ok(true)
    }

    /// Activate a plugin. Activating an active plugin changes nothing.
    pub fn activate(&self, name: &str) -> Result<PluginState, PluginError> {
        let mut status = self.status.lock();
        let plugin = self
            .runtime
            .get_plugin(name)
            .ok_or_else(|| PluginError::not_found(name))?;

        if status.active_plugins.contains(name) {
            return Ok(PluginState::Active);
        }
        check_dependencies(&plugin.info, &status.active_plugins)?;

        let mut batch = self.rewrites.batch();
        tap::activate(&plugin, &mut batch);
        if let Some(rules) = batch.into_flushed() {
            status.rewrite_rules = Some(rules);
        }
        status.active_plugins.insert(name.to_string());
        self.persist(&status);

        info!(plugin = %name, "plugin activated");
        Ok(PluginState::Active)
    }

    /// Deactivate a plugin. Deactivating an inactive plugin changes nothing.
    pub fn deactivate(&self, name: &str) -> Result<PluginState, PluginError> {
        let mut status = self.status.lock();
        let plugin = self
            .runtime
            .get_plugin(name)
            .ok_or_else(|| PluginError::not_found(name))?;

        if !status.active_plugins.contains(name) {
            return Ok(PluginState::Inactive);
        }

        let mut batch = self.rewrites.batch();
        tap::deactivate(&plugin, &mut batch);
        if let Some(rules) = batch.into_flushed() {
            status.rewrite_rules = Some(rules);
        }
        status.active_plugins.remove(name);
        self.persist(&status);

        info!(plugin = %name, "plugin deactivated");
        Ok(PluginState::Inactive)
    }

    /// Activate plugins in dependency order. `None` activates every plugin.
    pub fn activate_configured(&self, names: Option<&[String]>) -> Result<(), PluginError> {
        let unknown = names
            .unwrap_or_default()
            .iter()
            .find(|n| self.runtime.get_plugin(n).is_none());
        if let Some(unknown) = unknown {
            return Err(PluginError::not_found(unknown));
        }

        for name in self.runtime.load_order() {
            if names.is_none_or(|wanted| wanted.contains(name)) {
                self.activate(name)?;
            }
        }
        Ok(())
    }

    pub fn state(&self, name: &str) -> Option<PluginState> {
        self.runtime.get_plugin(name)?;
        Some(if self.status.lock().active_plugins.contains(name) {
            PluginState::Active
        } else {
            PluginState::Inactive
        })
    }

    /// Every registered plugin, in dependency order.
    pub fn list(&self) -> Vec<PluginSummary> {
        let status = self.status.lock();
        self.runtime
            .load_order()
            .iter()
            .filter_map(|name| self.runtime.get_plugin(name))
            .map(|plugin| PluginSummary {
                name: plugin.info.name.clone(),
                description: plugin.info.description.clone(),
                version: plugin.info.version.clone(),
                dependencies: plugin.info.dependencies.clone(),
                status: if status.active_plugins.contains(&plugin.info.name) {
                    PluginState::Active
                } else {
                    PluginState::Inactive
                },
            })
            .collect()
    }

    fn persist(&self, status: &PluginStatus) {
        let Some(path) = &self.state_file else {
            return;
        };
        if let Err(e) = status.save(path) {
            warn!(path = %path.display(), error = %e, "failed to save plugin status");
        }
    }
}
