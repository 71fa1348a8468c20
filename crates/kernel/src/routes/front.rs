//! Front-end route handler.
//!
//! Rewritten requests arrive here as `/?post_type=...&pagename=...`; the
//! query is resolved to a published post and rendered as a minimal page.

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::{Router, routing::get};

use crate::rewrite::{QueryVars, resolve_post};
use crate::state::AppState;

use super::helpers::html_escape;

/// Create the front page router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(front_page))
}

/// Front page handler.
///
/// Without a `post_type` query var this is the home page. Otherwise the
/// post named by the query is rendered, or 404 if nothing matches.
async fn front_page(State(state): State<AppState>, RawQuery(raw): RawQuery) -> Response {
    let vars = QueryVars::parse(raw.as_deref().unwrap_or_default());

    if vars.post_type().is_none() {
        return Html(home_page(&state)).into_response();
    }

    match resolve_post(state.posts(), &vars) {
        Some(post) => {
            let title = html_escape(&post.title);
            Html(format!(
                "<!DOCTYPE html>\n<html><head><title>{title}</title></head>\
                 <body><article class=\"{post_type}\" data-id=\"{id}\"><h1>{title}</h1>\n{content}\n</article></body></html>",
                post_type = html_escape(&post.post_type),
                id = post.id,
                content = post.content,
            ))
            .into_response()
        }
        None => {
            tracing::debug!(query = ?raw, "front-end query matched no post");
            (
                StatusCode::NOT_FOUND,
                Html("<!DOCTYPE html>\n<html><head><title>Not Found</title></head><body><h1>Not Found</h1></body></html>".to_string()),
            )
                .into_response()
        }
    }
}

fn home_page(state: &AppState) -> String {
    let items: String = state
        .post_types()
        .rest_visible()
        .iter()
        .map(|def| {
            format!(
                "<li><a href=\"/wp-json/wp/v2/{base}\">{label}</a></li>",
                base = html_escape(&def.rest.rest_base),
                label = html_escape(&def.label),
            )
        })
        .collect();
    format!(
        "<!DOCTYPE html>\n<html><head><title>wordepress</title></head><body><h1>wordepress</h1><ul>{items}</ul></body></html>"
    )
}
