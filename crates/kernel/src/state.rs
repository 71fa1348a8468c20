//! Application state shared across all handlers.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use wordepress_sdk::Plugin;
use wordepress_sdk::types::PostTypeDefinition;

use crate::config::Config;
use crate::content::{
    DEFAULT_QUERY_VARS, MediaService, PostService, PostTypeRegistry, RestFieldRegistry,
};
use crate::plugin::{PluginLifecycle, PluginRuntime};
use crate::rewrite::RewriteEngine;
use crate::store::{MemoryStore, PostStore};
use crate::tap::{TapDispatcher, TapRegistry};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,

    /// Post type registry, adjusted by plugins during `tap_init`.
    post_types: PostTypeRegistry,

    /// REST fields registered during `tap_rest_api_init`.
    rest_fields: RestFieldRegistry,

    posts: Arc<PostService>,

    media: Arc<MediaService>,

    /// Active rewrite rule set.
    rewrites: RewriteEngine,

    plugin_runtime: Arc<PluginRuntime>,

    tap_dispatcher: Arc<TapDispatcher>,

    /// Plugin activation and deactivation.
    lifecycle: Arc<PluginLifecycle>,
}

impl AppState {
    /// Build the state and run the plugin bootstrap.
    ///
    /// Order: register the configured post types, `tap_init`,
    /// `tap_rest_api_init`, restore the saved plugin status, then activate
    /// the configured plugins.
    pub fn bootstrap(config: Config, plugins: Vec<Arc<dyn Plugin>>) -> Result<Self> {
        let post_types = PostTypeRegistry::new();
        for name in &config.post_types {
            post_types.register(PostTypeDefinition::new(name.as_str()));
        }

        let plugin_runtime =
            Arc::new(PluginRuntime::from_plugins(plugins).context("failed to load plugins")?);
        let tap_registry = Arc::new(TapRegistry::from_plugins(&plugin_runtime));
        let tap_dispatcher = Arc::new(TapDispatcher::new(tap_registry));

        tap_dispatcher.init(&post_types);

        let rest_fields = RestFieldRegistry::new();
        tap_dispatcher.rest_api_init(&rest_fields);

        let store: Arc<dyn PostStore> = Arc::new(MemoryStore::new());
        let posts = Arc::new(PostService::new(
            Arc::clone(&store),
            post_types.clone(),
            rest_fields.clone(),
        ));
        let media = Arc::new(MediaService::new(store));

        let rewrites = RewriteEngine::new(post_types.clone());
        let lifecycle = Arc::new(PluginLifecycle::new(
            Arc::clone(&plugin_runtime),
            rewrites.clone(),
            config.state_file.clone(),
        ));
        let restored = lifecycle
            .restore()
            .context("failed to restore plugin status")?;
        // A saved status replaces the activate-everything default
        if !restored || config.activate_plugins.is_some() {
            lifecycle
                .activate_configured(config.activate_plugins.as_deref())
                .context("failed to activate plugins")?;
        }

        info!(
            post_types = ?post_types.type_names(),
            rest_fields = rest_fields.len(),
            rewrite_rules = rewrites.rules().len(),
            "bootstrap complete"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                post_types,
                rest_fields,
                posts,
                media,
                rewrites,
                plugin_runtime,
                tap_dispatcher,
                lifecycle,
            }),
        })
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn post_types(&self) -> &PostTypeRegistry {
        &self.inner.post_types
    }

    pub fn rest_fields(&self) -> &RestFieldRegistry {
        &self.inner.rest_fields
    }

    pub fn posts(&self) -> &Arc<PostService> {
        &self.inner.posts
    }

    pub fn media(&self) -> &Arc<MediaService> {
        &self.inner.media
    }

    pub fn rewrites(&self) -> &RewriteEngine {
        &self.inner.rewrites
    }

    pub fn plugin_runtime(&self) -> &Arc<PluginRuntime> {
        &self.inner.plugin_runtime
    }

    pub fn tap_dispatcher(&self) -> &Arc<TapDispatcher> {
        &self.inner.tap_dispatcher
    }

    pub fn lifecycle(&self) -> &Arc<PluginLifecycle> {
        &self.inner.lifecycle
    }

    /// Query vars usable through `filter[...]`: the defaults run through
    /// `tap_rest_query_vars`, de-duplicated.
    pub fn query_vars(&self) -> HashSet<String> {
        let defaults = DEFAULT_QUERY_VARS.iter().map(|v| v.to_string()).collect();
        self.inner
            .tap_dispatcher
            .rest_query_vars(defaults)
            .into_iter()
            .collect()
    }
}
