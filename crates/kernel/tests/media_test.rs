//! Media upload integration tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};

use common::{TestApp, body_json, body_string};
use wordepress_test_utils::basic_auth;

const PNG: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H', b'D', b'R',
];

fn upload(filename: &str, content_type: Option<&str>, bytes: &[u8]) -> Request<Body> {
    let mut builder = Request::post("/wp-json/wp/v2/media")
        .header(header::AUTHORIZATION, basic_auth())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        );
    if let Some(ct) = content_type {
        builder = builder.header(header::CONTENT_TYPE, ct);
    }
    builder.body(Body::from(bytes.to_vec())).unwrap()
}

#[tokio::test]
async fn upload_then_serve() {
    let app = TestApp::new();

    let response = app.request(upload("abc123.png", None, PNG)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let media = body_json(response).await;
    assert_eq!(media["media_details"]["file"], "abc123.png");
    assert_eq!(media["mime_type"], "image/png");
    assert_eq!(
        media["source_url"],
        "http://localhost:3000/wp-content/uploads/abc123.png"
    );

    let response = app.get("/wp-content/uploads/abc123.png").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let etag = response.headers()[header::ETAG].clone();

    let response = app
        .request(
            Request::get("/wp-content/uploads/abc123.png")
                .header(header::IF_NONE_MATCH, etag)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
}

#[tokio::test]
async fn duplicate_names_get_numbered() {
    let app = TestApp::new();
    app.request(upload("diagram.svg", Some("image/svg+xml"), b"<svg/>"))
        .await;
    let response = app
        .request(upload("diagram.svg", Some("image/svg+xml"), b"<svg></svg>"))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let media = body_json(response).await;
    assert_eq!(media["media_details"]["file"], "diagram-1.svg");
    assert_eq!(media["mime_type"], "image/svg+xml");
}

#[tokio::test]
async fn upload_requires_auth_and_disposition() {
    let app = TestApp::new();

    let response = app
        .request(
            Request::post("/wp-json/wp/v2/media")
                .header(header::CONTENT_DISPOSITION, "attachment; filename=\"a.png\"")
                .body(Body::from(PNG.to_vec()))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            Request::post("/wp-json/wp/v2/media")
                .header(header::AUTHORIZATION, basic_auth())
                .body(Body::from(PNG.to_vec()))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["code"],
        "rest_upload_no_content_disposition"
    );

    let response = app.request(upload("empty.png", None, b"")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn uploads_above_the_limit_are_rejected() {
    let app = TestApp::with_config(wordepress_kernel::config::Config {
        max_upload_bytes: 8,
        ..common::test_config()
    });
    let response = app.request(upload("big.png", None, PNG)).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn missing_upload_is_not_found() {
    let app = TestApp::new();
    let response = app.get("/wp-content/uploads/nope.png").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("rest_upload_not_found"));
}
