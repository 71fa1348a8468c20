//! Plugin system for Wordepress.
//!
//! This module handles:
//! - Parsing plugin metadata from `.info.toml` manifests
//! - Registering natively linked plugins
//! - Managing plugin dependencies
//! - Activation and deactivation, with persisted status

mod dependency;
mod error;
mod info_parser;
mod lifecycle;
mod runtime;
mod status;

pub use dependency::{check_dependencies, resolve_load_order};
pub use error::PluginError;
pub use info_parser::{KNOWN_TAPS, PluginInfo, TapConfig};
pub use lifecycle::{PluginLifecycle, PluginState, PluginSummary};
pub use runtime::{LoadedPlugin, PluginRuntime};
pub use status::PluginStatus;
