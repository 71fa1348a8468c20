//! Rewrite middleware for front-end URLs.
//!
//! Rewrites requests matching an active rewrite rule to `/?{internal query}`,
//! enabling human-readable URLs like `/docs/product/1-0/intro` instead of
//! `/?post_type=documentation&pagename=product-1-0-intro`.

use axum::{
    body::Body,
    extract::State,
    http::{Request, Uri},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::rewrite::QueryVars;
use crate::state::AppState;

/// Middleware resolving front-end paths through the rewrite rules.
///
/// The original query string, if any, is appended after the internal query.
/// API, upload and health paths are never rewritten.
pub async fn resolve_rewrites(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if path == "/"
        || path == "/health"
        || path.starts_with("/wp-json")
        || path.starts_with("/wp-content")
    {
        return next.run(request).await;
    }

    if let Some(vars) = state.rewrites().resolve(path) {
        match rewrite_uri(request.uri(), &vars) {
            Ok(new_uri) => {
                debug!(path = %path, new_uri = %new_uri, "rewrote request");
                *request.uri_mut() = new_uri;
            }
            Err(e) => {
                debug!(path = %path, error = %e, "rewritten URI is invalid");
            }
        }
    }

    next.run(request).await
}

/// Build `/?{internal}` followed by the original query string.
fn rewrite_uri(original: &Uri, vars: &QueryVars) -> Result<Uri, axum::http::uri::InvalidUri> {
    let internal = vars.to_query_string();
    match original.query() {
        Some(query) if !query.is_empty() => format!("/?{internal}&{query}").parse(),
        _ => format!("/?{internal}").parse(),
    }
}
