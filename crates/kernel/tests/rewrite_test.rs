//! Front-end rewrite integration tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::http::StatusCode;

use common::{TestApp, body_string};
use wordepress_test_utils::{assert, test_doc};

/// Publish `intro-setup-overview` with a child `intro-setup-extra`.
async fn seed(app: &TestApp) -> (u64, u64) {
    let parent = app
        .create(
            "documentation",
            &test_doc("Overview page").with_slug("intro-setup-overview"),
        )
        .await;
    let parent_id = parent["id"].as_u64().unwrap();
    let child = app
        .create(
            "documentation",
            &test_doc("Extra page")
                .with_slug("intro-setup-extra")
                .with_parent(parent_id),
        )
        .await;
    (parent_id, child["id"].as_u64().unwrap())
}

#[tokio::test]
async fn three_segment_docs_path_resolves_page() {
    let app = TestApp::new();
    let (parent_id, _) = seed(&app).await;

    let rewritten = app.get("/docs/intro/setup/overview").await;
    assert_eq!(rewritten.status(), StatusCode::OK);
    let rewritten = body_string(rewritten).await;
    assert::contains(&rewritten, "<h1>Overview page</h1>");
    assert::contains(&rewritten, &format!("data-id=\"{parent_id}\""));

    let direct = app
        .get("/?post_type=documentation&pagename=intro-setup-overview")
        .await;
    assert_eq!(body_string(direct).await, rewritten);
}

#[tokio::test]
async fn four_segment_docs_path_resolves_child_page() {
    let app = TestApp::new();
    let (_, child_id) = seed(&app).await;

    let response = app.get("/docs/intro/setup/overview/extra").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert::contains(&html, &format!("data-id=\"{child_id}\""));

    let direct = app
        .get("/?post_type=documentation&pagename=intro-setup-overview%2Fintro-setup-extra")
        .await;
    assert_eq!(body_string(direct).await, html);
}

#[tokio::test]
async fn trailing_slash_and_unknown_pages() {
    let app = TestApp::new();
    seed(&app).await;

    let response = app.get("/docs/intro/setup/overview/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert::contains(&body_string(response).await, "Overview");

    let response = app.get("/docs/intro/setup/missing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Child segment names a page whose parent chain does not match
    let response = app.get("/docs/intro/setup/extra/overview").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn generated_post_type_rule_serves_page_paths() {
    let app = TestApp::new();
    seed(&app).await;

    let response = app
        .get("/documentation/intro-setup-overview/intro-setup-extra/")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert::contains(&body_string(response).await, "Extra page");
}

#[tokio::test]
async fn docs_paths_need_activation() {
    let app = TestApp::inactive();
    seed(&app).await;

    let response = app.get("/docs/intro/setup/overview").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .get("/documentation/intro-setup-overview/")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn drafts_are_not_served() {
    let app = TestApp::new();
    app.create(
        "documentation",
        &test_doc("Hidden").with_slug("intro-setup-hidden").draft(),
    )
    .await;

    let response = app.get("/docs/intro/setup/hidden").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn home_page_lists_rest_types() {
    let app = TestApp::new();
    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert::contains(&html, "/wp-json/wp/v2/documentation");
    assert::contains(&html, "/wp-json/wp/v2/tutorials");
}
