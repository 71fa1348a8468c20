//! Plugin dependency resolution using topological sort.
//!
//! Uses Kahn's algorithm with cycle detection. Ties are broken by name so
//! the order is deterministic.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::error::PluginError;
use super::info_parser::PluginInfo;

/// Resolve plugin order so that dependencies come before dependents.
///
/// # Errors
/// - a plugin declares a dependency that isn't loaded
/// - there is a circular dependency
pub fn resolve_load_order(plugins: &HashMap<String, PluginInfo>) -> Result<Vec<String>, PluginError> {
    // in_degree[p] = number of plugins p depends on
    let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for name in plugins.keys() {
        in_degree.insert(name, 0);
    }

    for (name, info) in plugins {
        for dep in &info.dependencies {
            if !plugins.contains_key(dep) {
                return Err(PluginError::not_installed(name, dep));
            }
            if let Some(degree) = in_degree.get_mut(name.as_str()) {
                *degree += 1;
            }
            dependents.entry(dep.as_str()).or_default().push(name);
        }
    }

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(name, _)| *name)
        .collect();
    let mut result = Vec::with_capacity(plugins.len());

    while let Some(plugin) = ready.pop_first() {
        result.push(plugin.to_string());

        for dependent in dependents.get(plugin).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(*dependent);
                }
            }
        }
    }

    if result.len() != plugins.len() {
        let loaded: HashSet<_> = result.iter().map(String::as_str).collect();
        let mut in_cycle: Vec<_> = plugins
            .keys()
            .filter(|k| !loaded.contains(k.as_str()))
            .cloned()
            .collect();
        in_cycle.sort();

        return Err(PluginError::CircularDependency {
            cycle: in_cycle.join(", "),
        });
    }

    Ok(result)
}

/// Check that every dependency of `plugin` is in `active`.
pub fn check_dependencies(plugin: &PluginInfo, active: &BTreeSet<String>) -> Result<(), PluginError> {
    match plugin.dependencies.iter().find(|dep| !active.contains(*dep)) {
        Some(dep) => Err(PluginError::not_active(&plugin.name, dep)),
        None => Ok(()),
    }
}
