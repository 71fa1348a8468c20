//! Plugin status persistence.
//!
//! The set of active plugins and the last flushed rewrite rules are saved to
//! an optional JSON state file so they survive a restart.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use wordepress_sdk::types::RewriteRule;

/// Persisted plugin status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginStatus {
    #[serde(default)]
    pub active_plugins: BTreeSet<String>,

    /// Rule set installed by the last flush. `None` until a flush happens.
    #[serde(default)]
    pub rewrite_rules: Option<Vec<RewriteRule>>,
}

impl PluginStatus {
    /// Load the state file. A missing file yields `None`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read state file: {}", path.display()));
            }
        };
        let status = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse state file: {}", path.display()))?;
        Ok(Some(status))
    }

    /// Write the state file, replacing it atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).context("failed to serialize plugin status")?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("failed to write state file: {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("failed to replace state file: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wordepress_sdk::types::RewritePosition;

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PluginStatus::load(&dir.path().join("state.json")).unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let status = PluginStatus {
            active_plugins: ["docs_api".to_string()].into(),
            rewrite_rules: Some(vec![RewriteRule::new(
                "docs/([^/]+)",
                "index.php?pagename=$matches[1]",
                RewritePosition::Top,
            )]),
        };
        status.save(&path).unwrap();
        assert_eq!(PluginStatus::load(&path).unwrap(), Some(status));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = PluginStatus::load(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse state file"));
    }
}
