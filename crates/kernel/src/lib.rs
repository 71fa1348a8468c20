//! Wordepress kernel library.
//!
//! Post store, REST controller, rewrite engine and plugin runtime. The
//! `wordepress-server` binary wires these together; integration tests build
//! the same router through [`build_router`].

pub mod config;
pub mod content;
pub mod error;
pub mod middleware;
pub mod models;
pub mod plugin;
pub mod rewrite;
pub mod routes;
pub mod state;
pub mod store;
pub mod tap;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Build the application router with every route and middleware layer.
///
/// Rewrite resolution has to change the URI before routing, so it wraps the
/// routed application from the outside. Layers run outermost first: trace,
/// rewrite resolution, Basic auth.
pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config().max_upload_bytes;

    let app = Router::new()
        .merge(routes::front::router())
        .merge(routes::health::router())
        .merge(routes::posts::router())
        .merge(routes::media::router(max_upload_bytes))
        .merge(routes::plugin_admin::router())
        .fallback(|| async { AppError::no_route() })
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::authenticate_basic,
        ))
        .with_state(state.clone());

    Router::new()
        .fallback_service(app)
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::resolve_rewrites,
        ))
        .layer(TraceLayer::new_for_http())
}
