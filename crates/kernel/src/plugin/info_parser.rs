//! Parser for plugin `.info.toml` manifest files.
//!
//! Each plugin ships a `{name}.info.toml` file that declares metadata:
//! - name, version, description
//! - dependencies (other plugins that must be active first)
//! - taps (which extension points the plugin implements, and its weight)

use serde::Deserialize;
use wordepress_sdk::plugin::taps;

use super::error::PluginError;

/// Plugin metadata parsed from `.info.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginInfo {
    /// Plugin machine name.
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// Semantic version (e.g., "1.0.0").
    pub version: String,

    /// Other plugins this one depends on.
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Tap configuration.
    #[serde(default)]
    pub taps: TapConfig,
}

/// Configuration for which taps a plugin implements.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TapConfig {
    /// Tap names this plugin implements, e.g. `["tap_init", "tap_activate"]`.
    #[serde(default)]
    pub implements: Vec<String>,

    /// Weight for ordering (lower = called first, default 0).
    #[serde(default)]
    pub weight: i32,
}

/// Known tap names for validation.
pub const KNOWN_TAPS: &[&str] = &[
    // Bootstrap
    taps::INIT,
    taps::REST_API_INIT,
    // Per request
    taps::REST_QUERY_VARS,
    // Lifecycle
    taps::ACTIVATE,
    taps::DEACTIVATE,
];

impl PluginInfo {
    /// Parse plugin info from a TOML string. `source` names the manifest in errors.
    pub fn parse_str(content: &str, source: &str) -> Result<Self, PluginError> {
        let info: PluginInfo = toml::from_str(content)
            .map_err(|e| PluginError::invalid_manifest(source, e.to_string()))?;

        info.validate()?;
        Ok(info)
    }

    /// Whether the manifest lists `tap`.
    pub fn implements(&self, tap: &str) -> bool {
        self.taps.implements.iter().any(|t| t == tap)
    }

    fn validate(&self) -> Result<(), PluginError> {
        if self.name.is_empty() {
            return Err(PluginError::invalid_manifest(
                "<unnamed>",
                "empty 'name' field",
            ));
        }

        if self.version.is_empty() {
            return Err(PluginError::invalid_manifest(
                &self.name,
                "empty 'version' field",
            ));
        }

        if let Some(tap) = self
            .taps
            .implements
            .iter()
            .find(|tap| !KNOWN_TAPS.contains(&tap.as_str()))
        {
            return Err(PluginError::unknown_tap(&self.name, tap, KNOWN_TAPS));
        }

        Ok(())
    }
}
