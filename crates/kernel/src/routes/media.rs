//! Media upload and download routes.
//!
//! - `POST /wp-json/wp/v2/media` stores the raw request body as an attachment
//!   named by `Content-Disposition`.
//! - `GET /wp-content/uploads/{file}` serves it back.

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::content::media_service::disposition_filename;
use crate::error::{AppError, AppResult};
use crate::middleware::Authenticated;
use crate::models::Media;
use crate::state::AppState;

/// Create the media router. Upload bodies are capped at `max_upload_bytes`.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/wp-json/wp/v2/media",
            post(upload_media).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/wp-content/uploads/{file}", get(serve_upload))
}

/// POST /wp-json/wp/v2/media
async fn upload_media(
    State(state): State<AppState>,
    auth: Authenticated,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let filename = headers
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(disposition_filename)
        .ok_or_else(|| {
            AppError::bad_request(
                "rest_upload_no_content_disposition",
                "No Content-Disposition supplied.",
            )
        })?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let media = state.media().upload(&filename, content_type, body)?;
    tracing::debug!(user = %auth.user, requested = %filename, file = %media.file, "attachment stored");

    let location = format!("{}/wp-json/wp/v2/media/{}", state.config().site_url, media.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(media_json(&state, &media)),
    )
        .into_response())
}

/// GET|HEAD /wp-content/uploads/{file}
async fn serve_upload(
    State(state): State<AppState>,
    Path(file): Path<String>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let media = state.media().get(&file).ok_or_else(|| AppError::NotFound {
        code: "rest_upload_not_found",
        message: "File not found.".to_string(),
    })?;

    let etag = format!("\"{}\"", media.sha256);
    let unchanged = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == etag);
    if unchanged {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }

    Ok((
        [
            (header::CONTENT_TYPE, media.mime_type.clone()),
            (header::ETAG, etag),
        ],
        media.bytes,
    )
        .into_response())
}

fn media_json(state: &AppState, media: &Media) -> Value {
    json!({
        "id": media.id,
        "date": media.created.format("%Y-%m-%dT%H:%M:%S").to_string(),
        "type": "attachment",
        "source_url": format!("{}/wp-content/uploads/{}", state.config().site_url, media.file),
        "mime_type": media.mime_type,
        "media_details": {
            "file": media.file,
            "filesize": media.bytes.len(),
            "sha256": media.sha256,
        },
    })
}
