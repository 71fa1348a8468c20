//! Plugin system error types with clear, actionable messages.
//!
//! All errors include the plugin name and relevant context.

use thiserror::Error;

/// Errors that can occur while loading or activating plugins.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The `.info.toml` manifest could not be parsed or is incomplete.
    #[error("plugin '{plugin}': invalid manifest: {details}")]
    InvalidManifest { plugin: String, details: String },

    /// Plugin declares a tap that doesn't exist.
    #[error("plugin '{plugin}': declares unknown tap '{tap}'. Valid taps: {valid_taps}")]
    UnknownTap {
        plugin: String,
        tap: String,
        valid_taps: String,
    },

    /// Two plugins share a machine name.
    #[error("plugin '{plugin}': registered twice")]
    DuplicatePlugin { plugin: String },

    /// Plugin depends on another plugin that isn't loaded or active.
    #[error("plugin '{plugin}': depends on '{dependency}' which is not {state}")]
    MissingDependency {
        plugin: String,
        dependency: String,
        state: &'static str,
    },

    /// Circular dependency detected.
    #[error("circular dependency detected involving plugins: {cycle}")]
    CircularDependency { cycle: String },

    /// No plugin with this name is loaded.
    #[error("plugin '{plugin}': not found")]
    NotFound { plugin: String },
}

impl PluginError {
    pub fn invalid_manifest(plugin: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidManifest {
            plugin: plugin.into(),
            details: details.into(),
        }
    }

    /// Create an unknown tap error listing the valid taps.
    pub fn unknown_tap(plugin: impl Into<String>, tap: impl Into<String>, valid: &[&str]) -> Self {
        Self::UnknownTap {
            plugin: plugin.into(),
            tap: tap.into(),
            valid_taps: valid.join(", "),
        }
    }

    /// A dependency missing from the loaded plugins.
    pub fn not_installed(plugin: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self::MissingDependency {
            plugin: plugin.into(),
            dependency: dependency.into(),
            state: "installed",
        }
    }

    /// A loaded dependency that has not been activated.
    pub fn not_active(plugin: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self::MissingDependency {
            plugin: plugin.into(),
            dependency: dependency.into(),
            state: "active",
        }
    }

    pub fn not_found(plugin: impl Into<String>) -> Self {
        Self::NotFound {
            plugin: plugin.into(),
        }
    }
}
