//! Posts REST controller.
//!
//! Every REST-visible post type is served under `/wp-json/wp/v2/{rest_base}`:
//!
//! - `GET    /wp-json/wp/v2/{base}`       list, with `filter[...]` query vars
//! - `POST   /wp-json/wp/v2/{base}`       create (authenticated)
//! - `GET    /wp-json/wp/v2/{base}/{id}`  read
//! - `POST|PUT|PATCH /wp-json/wp/v2/{base}/{id}` update (authenticated)
//! - `DELETE /wp-json/wp/v2/{base}/{id}`  trash, or delete with `force=true`

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Map, Value, json};
use tracing::info;
use wordepress_sdk::types::PostTypeDefinition;

use crate::content::query::Context;
use crate::content::PostQuery;
use crate::error::{AppError, AppResult};
use crate::middleware::Authenticated;
use crate::models::{CreatePost, Post, PostStatus, UpdatePost};
use crate::state::AppState;

use super::helpers::{is_truthy, json_object, query_pairs, query_param};

/// Create the posts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/wp-json/wp/v2/{base}", get(list_posts).post(create_post))
        .route(
            "/wp-json/wp/v2/{base}/{id}",
            get(get_post)
                .post(update_post)
                .put(update_post)
                .patch(update_post)
                .delete(delete_post),
        )
}

/// GET /wp-json/wp/v2/{base}
async fn list_posts(
    State(state): State<AppState>,
    Path(base): Path<String>,
    RawQuery(raw): RawQuery,
    auth: Option<Authenticated>,
) -> AppResult<Response> {
    let post_type = rest_type(&state, &base)?;
    let query = PostQuery::from_pairs(&query_pairs(raw.as_deref()), &state.query_vars())?;
    if query.requires_auth() && auth.is_none() {
        return Err(AppError::Unauthorized);
    }

    let (posts, total) = state.posts().list(&post_type.machine_name, &query);
    let body: Vec<Value> = posts
        .iter()
        .map(|post| post_json(&state, &post_type, post, query.context))
        .collect();

    let mut response = Json(body).into_response();
    let headers = response.headers_mut();
    headers.insert("x-wp-total", HeaderValue::from(total));
    headers.insert(
        "x-wp-totalpages",
        HeaderValue::from(total.div_ceil(query.per_page)),
    );
    Ok(response)
}

/// GET /wp-json/wp/v2/{base}/{id}
async fn get_post(
    State(state): State<AppState>,
    Path((base, id)): Path<(String, String)>,
    RawQuery(raw): RawQuery,
    auth: Option<Authenticated>,
) -> AppResult<Json<Value>> {
    let post_type = rest_type(&state, &base)?;
    let id = post_id(&id)?;
    let pairs = query_pairs(raw.as_deref());
    let context = match query_param(&pairs, "context") {
        Some("edit") => Context::Edit,
        Some("view" | "embed") | None => Context::View,
        Some(_) => return Err(AppError::invalid_param("Invalid parameter(s): context")),
    };

    let post = state.posts().get(&post_type.machine_name, id)?;
    if auth.is_none() && (context == Context::Edit || !post.status.is_public()) {
        return Err(AppError::Unauthorized);
    }
    Ok(Json(post_json(&state, &post_type, &post, context)))
}

/// POST /wp-json/wp/v2/{base}
async fn create_post(
    State(state): State<AppState>,
    Path(base): Path<String>,
    auth: Authenticated,
    body: Bytes,
) -> AppResult<Response> {
    let post_type = rest_type(&state, &base)?;
    let body = json_object(&body)?;
    if body.contains_key("id") {
        return Err(AppError::bad_request(
            "rest_post_exists",
            "Cannot create existing post.",
        ));
    }

    let input = CreatePost {
        post_type: post_type.machine_name.clone(),
        title: text_param(&body, "title")?.unwrap_or_default(),
        content: text_param(&body, "content")?.unwrap_or_default(),
        status: status_param(&body)?.unwrap_or_default(),
        slug: string_param(&body, "slug")?,
        parent: id_param(&body, "parent")?.unwrap_or(0),
        menu_order: order_param(&body)?.unwrap_or(0),
    };
    let post = state.posts().create(input, &body)?;
    info!(user = %auth.user, post_type = %post.post_type, id = post.id, slug = %post.slug, "post created via REST");

    let location = format!(
        "{}/wp-json/wp/v2/{}/{}",
        state.config().site_url,
        post_type.rest.rest_base,
        post.id
    );
    let body = post_json(&state, &post_type, &post, Context::Edit);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(body),
    )
        .into_response())
}

/// POST|PUT|PATCH /wp-json/wp/v2/{base}/{id}
async fn update_post(
    State(state): State<AppState>,
    Path((base, id)): Path<(String, String)>,
    auth: Authenticated,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let post_type = rest_type(&state, &base)?;
    let id = post_id(&id)?;
    let body = json_object(&body)?;

    let input = UpdatePost {
        title: text_param(&body, "title")?,
        content: text_param(&body, "content")?,
        status: status_param(&body)?,
        slug: string_param(&body, "slug")?,
        parent: id_param(&body, "parent")?,
        menu_order: order_param(&body)?,
    };
    let post = state
        .posts()
        .update(&post_type.machine_name, id, input, &body)?;
    info!(user = %auth.user, post_type = %post.post_type, id, "post updated via REST");
    Ok(Json(post_json(&state, &post_type, &post, Context::Edit)))
}

/// DELETE /wp-json/wp/v2/{base}/{id}
async fn delete_post(
    State(state): State<AppState>,
    Path((base, id)): Path<(String, String)>,
    RawQuery(raw): RawQuery,
    auth: Authenticated,
) -> AppResult<Json<Value>> {
    let post_type = rest_type(&state, &base)?;
    let id = post_id(&id)?;
    let pairs = query_pairs(raw.as_deref());

    if is_truthy(query_param(&pairs, "force")) {
        let previous = state.posts().delete(&post_type.machine_name, id)?;
        info!(user = %auth.user, post_type = %previous.post_type, id, "post deleted via REST");
        return Ok(Json(json!({
            "deleted": true,
            "previous": post_json(&state, &post_type, &previous, Context::Edit),
        })));
    }

    let post = state.posts().trash(&post_type.machine_name, id)?;
    Ok(Json(post_json(&state, &post_type, &post, Context::Edit)))
}

fn rest_type(state: &AppState, base: &str) -> AppResult<PostTypeDefinition> {
    state
        .post_types()
        .find_by_rest_base(base)
        .ok_or_else(AppError::no_route)
}

/// Route ids are digits only; anything else does not match the route.
fn post_id(raw: &str) -> AppResult<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::no_route());
    }
    raw.parse().map_err(|_| AppError::invalid_post_id())
}

/// Serialize a post the way the REST API returns it.
pub fn post_json(
    state: &AppState,
    post_type: &PostTypeDefinition,
    post: &Post,
    context: Context,
) -> Value {
    let created = post.created.format("%Y-%m-%dT%H:%M:%S").to_string();
    let modified = post.modified.format("%Y-%m-%dT%H:%M:%S").to_string();

    let mut value = json!({
        "id": post.id,
        "date": created,
        "date_gmt": created,
        "modified": modified,
        "modified_gmt": modified,
        "slug": post.slug,
        "status": post.status.as_str(),
        "type": post.post_type,
        "link": link(state, post_type, post),
        "title": { "rendered": post.title },
        "content": { "rendered": post.content, "protected": false },
        "parent": post.parent,
        "menu_order": post.menu_order,
    });

    if context == Context::Edit {
        value["title"]["raw"] = json!(post.title);
        value["content"]["raw"] = json!(post.content);
    }
    if let Value::Object(map) = &mut value {
        map.extend(state.posts().field_values(post));
    }
    value
}

fn link(state: &AppState, post_type: &PostTypeDefinition, post: &Post) -> String {
    let site = &state.config().site_url;
    match &post_type.rewrite_slug {
        Some(slug) => format!("{site}/{slug}/{}/", state.posts().page_path(post)),
        None => format!("{site}/?post_type={}&p={}", post.post_type, post.id),
    }
}

/// A string, or an object carrying a `raw` string, as `title` and `content` accept.
fn text_param(body: &Map<String, Value>, name: &str) -> AppResult<Option<String>> {
    match body.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Object(obj)) => match obj.get("raw") {
            Some(Value::String(s)) => Ok(Some(s.clone())),
            None | Some(Value::Null) => Ok(None),
            Some(_) => Err(invalid(name)),
        },
        Some(_) => Err(invalid(name)),
    }
}

fn string_param(body: &Map<String, Value>, name: &str) -> AppResult<Option<String>> {
    match body.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(name)),
    }
}

fn status_param(body: &Map<String, Value>) -> AppResult<Option<PostStatus>> {
    string_param(body, "status")?
        .map(|s| s.parse().map_err(|_| invalid("status")))
        .transpose()
}

/// Non-negative integer, given as a number or a numeric string.
fn id_param(body: &Map<String, Value>, name: &str) -> AppResult<Option<u64>> {
    match body.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(|| invalid(name)),
        Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| invalid(name)),
        Some(_) => Err(invalid(name)),
    }
}

fn order_param(body: &Map<String, Value>) -> AppResult<Option<i64>> {
    match body.get("menu_order") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| invalid("menu_order")),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid("menu_order")),
        Some(_) => Err(invalid("menu_order")),
    }
}

fn invalid(name: &str) -> AppError {
    AppError::invalid_param(format!("Invalid parameter(s): {name}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn text_param_accepts_string_or_raw() {
        let b = body(json!({"title": "Plain", "content": {"raw": "<p>x</p>"}}));
        assert_eq!(text_param(&b, "title").unwrap().as_deref(), Some("Plain"));
        assert_eq!(text_param(&b, "content").unwrap().as_deref(), Some("<p>x</p>"));
        assert_eq!(text_param(&b, "missing").unwrap(), None);
        assert!(text_param(&body(json!({"title": 3})), "title").is_err());
    }

    #[test]
    fn numeric_params_accept_strings() {
        let b = body(json!({"parent": "12", "menu_order": -3}));
        assert_eq!(id_param(&b, "parent").unwrap(), Some(12));
        assert_eq!(order_param(&b).unwrap(), Some(-3));
        assert!(id_param(&body(json!({"parent": -1})), "parent").is_err());
        assert!(order_param(&body(json!({"menu_order": "x"}))).is_err());
    }

    #[test]
    fn status_param_rejects_unknown() {
        assert_eq!(
            status_param(&body(json!({"status": "draft"}))).unwrap(),
            Some(PostStatus::Draft)
        );
        assert!(status_param(&body(json!({"status": "bogus"}))).is_err());
    }

    #[test]
    fn post_id_requires_digits() {
        assert_eq!(post_id("42").unwrap(), 42);
        assert_eq!(post_id("abc").unwrap_err().status(), StatusCode::NOT_FOUND);
        assert!(post_id("").is_err());
    }
}
