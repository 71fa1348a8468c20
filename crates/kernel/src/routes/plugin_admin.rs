//! Admin routes for plugin management (activate/deactivate).
//!
//! All endpoints require Basic authentication.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use wordepress_sdk::types::RewriteRule;

use crate::error::{AppError, AppResult};
use crate::middleware::Authenticated;
use crate::plugin::{PluginError, PluginState, PluginSummary};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ToggleResponse {
    plugin: String,
    status: PluginState,
    rewrite_rules: usize,
}

/// Create the plugin admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/wp-json/wordepress/v1/plugins", get(list_plugins))
        .route(
            "/wp-json/wordepress/v1/plugins/{name}/activate",
            post(activate_plugin),
        )
        .route(
            "/wp-json/wordepress/v1/plugins/{name}/deactivate",
            post(deactivate_plugin),
        )
        .route("/wp-json/wordepress/v1/rewrite-rules", get(list_rewrite_rules))
}

/// GET /wp-json/wordepress/v1/plugins
async fn list_plugins(State(state): State<AppState>, _auth: Authenticated) -> Json<Vec<PluginSummary>> {
    Json(state.lifecycle().list())
}

/// POST /wp-json/wordepress/v1/plugins/{name}/activate
async fn activate_plugin(
    State(state): State<AppState>,
    Path(name): Path<String>,
    auth: Authenticated,
) -> AppResult<Json<ToggleResponse>> {
    let status = state.lifecycle().activate(&name).map_err(plugin_error)?;
    tracing::info!(user = %auth.user, plugin = %name, "plugin activated via admin API");
    Ok(Json(ToggleResponse {
        plugin: name,
        status,
        rewrite_rules: state.rewrites().rules().len(),
    }))
}

/// POST /wp-json/wordepress/v1/plugins/{name}/deactivate
async fn deactivate_plugin(
    State(state): State<AppState>,
    Path(name): Path<String>,
    auth: Authenticated,
) -> AppResult<Json<ToggleResponse>> {
    let status = state.lifecycle().deactivate(&name).map_err(plugin_error)?;
    tracing::info!(user = %auth.user, plugin = %name, "plugin deactivated via admin API");
    Ok(Json(ToggleResponse {
        plugin: name,
        status,
        rewrite_rules: state.rewrites().rules().len(),
    }))
}

/// GET /wp-json/wordepress/v1/rewrite-rules
async fn list_rewrite_rules(State(state): State<AppState>, _auth: Authenticated) -> Json<Vec<RewriteRule>> {
    Json(state.rewrites().rules())
}

fn plugin_error(e: PluginError) -> AppError {
    match e {
        PluginError::NotFound { .. } => AppError::NotFound {
            code: "rest_plugin_not_found",
            message: e.to_string(),
        },
        other => AppError::bad_request("rest_plugin_error", other.to_string()),
    }
}
