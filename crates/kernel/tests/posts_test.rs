//! Posts REST controller integration tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;

use common::{TestApp, body_json};
use wordepress_test_utils::{assert, basic_auth_for, test_doc};

fn meta_filter(product: &str, tag: &str) -> String {
    format!(
        "filter%5Bmeta_query%5D%5B0%5D%5Bkey%5D=wpcf-product&filter%5Bmeta_query%5D%5B0%5D%5Bvalue%5D={product}\
         &filter%5Bmeta_query%5D%5B1%5D%5Bkey%5D=wpcf-tag&filter%5Bmeta_query%5D%5B1%5D%5Bvalue%5D={tag}"
    )
}

#[tokio::test]
async fn documentation_fields_round_trip_through_rest() {
    let app = TestApp::new();
    let created = app
        .create(
            "documentation",
            &test_doc("Overview")
                .with_content("<p>Hello</p>")
                .documentation("<b>net</b>", "2.0", "overview", "latest"),
        )
        .await;

    assert::str_field(&created, "wpcf-product", "net");
    assert::str_field(&created, "wpcf-version", "2.0");
    assert::str_field(&created, "wpcf-tag", "latest");
    assert_eq!(created["type"], "documentation");
    assert_eq!(created["title"]["raw"], "Overview");

    let id = created["id"].as_u64().unwrap();
    let response = app.get(&format!("/wp-json/wp/v2/documentation/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert::str_field(&fetched, "wpcf-name", "overview");
    assert_eq!(fetched["title"]["rendered"], "Overview");
    assert!(fetched["title"].get("raw").is_none());
}

#[tokio::test]
async fn falsy_and_non_string_field_values_are_ignored() {
    let app = TestApp::new();
    let created = app
        .create(
            "documentation",
            &test_doc("Intro").documentation("net", "1.0", "intro", "v1"),
        )
        .await;
    let id = created["id"].as_u64().unwrap();

    for value in [json!(""), json!("0"), json!(7), json!(["x"]), json!(null)] {
        let response = app
            .send_json(
                "PUT",
                &format!("/wp-json/wp/v2/documentation/{id}"),
                &json!({ "wpcf-name": value }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert::str_field(&body_json(response).await, "wpcf-name", "intro");
    }
}

#[tokio::test]
async fn unset_fields_read_as_empty_strings() {
    let app = TestApp::new();
    let created = app.create("documentation", &test_doc("Bare")).await;
    assert::str_field(&created, "wpcf-product", "");
    assert::str_field(&created, "wpcf-tag", "");
}

#[tokio::test]
async fn tutorials_only_carry_name_field() {
    let app = TestApp::new();
    let created = app
        .create(
            "tutorials",
            &test_doc("First steps").documentation("tutorials", "latest", "first-steps", "latest"),
        )
        .await;

    assert::str_field(&created, "wpcf-name", "first-steps");
    assert!(created.get("wpcf-product").is_none());
    assert!(created.get("wpcf-tag").is_none());
}

#[tokio::test]
async fn meta_query_filters_documentation_list() {
    let app = TestApp::new();
    for (title, product, tag) in [
        ("A", "net", "latest"),
        ("B", "net", "v1"),
        ("C", "scope", "latest"),
        ("D", "net", "latest"),
    ] {
        app.create(
            "documentation",
            &test_doc(title).documentation(product, "1.0", title, tag),
        )
        .await;
    }

    let response = app
        .get(&format!(
            "/wp-json/wp/v2/documentation?per_page=100&{}",
            meta_filter("net", "latest")
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-wp-total"], "2");
    let list = body_json(response).await;
    let titles: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"]["rendered"].as_str().unwrap())
        .collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"A") && titles.contains(&"D"));
}

#[tokio::test]
async fn meta_query_is_permitted_for_inactive_plugins() {
    let app = TestApp::inactive();
    assert!(app.state.query_vars().contains("meta_query"));
    assert!(app.state.query_vars().contains("pagename"));
}

#[tokio::test]
async fn pagination_headers_and_past_the_end() {
    let app = TestApp::new();
    for n in 0..3 {
        app.create("documentation", &test_doc(&format!("Doc {n}")))
            .await;
    }

    let response = app.get("/wp-json/wp/v2/documentation?per_page=2").await;
    assert_eq!(response.headers()["x-wp-total"], "3");
    assert_eq!(response.headers()["x-wp-totalpages"], "2");
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    let response = app
        .get("/wp-json/wp/v2/documentation?per_page=2&page=5")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn writes_require_valid_credentials() {
    let app = TestApp::new();

    let anonymous = app
        .request(
            Request::post("/wp-json/wp/v2/documentation")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(test_doc("X").to_json().to_string()))
                .unwrap(),
        )
        .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(anonymous).await["code"], "rest_forbidden");

    let wrong = app
        .request(
            Request::post("/wp-json/wp/v2/documentation")
                .header(header::AUTHORIZATION, basic_auth_for("admin", "nope"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_rest_base_is_no_route() {
    let app = TestApp::new();
    let response = app.get("/wp-json/wp/v2/pages").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "rest_no_route");

    let response = app.get("/wp-json/wp/v2/documentation/not-a-number").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn requested_slugs_are_honoured_and_deduplicated() {
    let app = TestApp::new();
    let first = app
        .create("documentation", &test_doc("One").with_slug("net-latest-intro"))
        .await;
    assert_eq!(first["slug"], "net-latest-intro");

    let second = app
        .create("documentation", &test_doc("Two").with_slug("net-latest-intro"))
        .await;
    assert_eq!(second["slug"], "net-latest-intro-2");

    let child = app
        .create(
            "documentation",
            &test_doc("Child")
                .with_slug("net-latest-intro")
                .with_parent(first["id"].as_u64().unwrap()),
        )
        .await;
    assert_eq!(child["slug"], "net-latest-intro");
    assert_eq!(child["parent"], first["id"]);
}

#[tokio::test]
async fn link_follows_page_path() {
    let app = TestApp::new();
    let parent = app
        .create("documentation", &test_doc("Parent").with_slug("net-latest-guide"))
        .await;
    let child = app
        .create(
            "documentation",
            &test_doc("Child")
                .with_slug("net-latest-step")
                .with_parent(parent["id"].as_u64().unwrap()),
        )
        .await;

    assert_eq!(
        child["link"],
        "http://localhost:3000/documentation/net-latest-guide/net-latest-step/"
    );
}

#[tokio::test]
async fn drafts_are_hidden_from_anonymous_readers() {
    let app = TestApp::new();
    let draft = app
        .create("documentation", &test_doc("Secret").draft())
        .await;
    let id = draft["id"].as_u64().unwrap();

    let list = body_json(app.get("/wp-json/wp/v2/documentation").await).await;
    assert_eq!(list, json!([]));

    let response = app.get(&format!("/wp-json/wp/v2/documentation/{id}")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.get("/wp-json/wp/v2/documentation?status=draft").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .get_auth("/wp-json/wp/v2/documentation?status=draft&context=edit")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await[0]["title"]["raw"], "Secret");
}

#[tokio::test]
async fn delete_trashes_then_force_deletes() {
    let app = TestApp::new();
    let post = app
        .create("documentation", &test_doc("Doomed").with_slug("doomed"))
        .await;
    let uri = format!("/wp-json/wp/v2/documentation/{}", post["id"]);

    let trashed = body_json(app.delete(&uri).await).await;
    assert_eq!(trashed["status"], "trash");
    assert_eq!(trashed["slug"], "doomed__trashed");

    let again = app.delete(&uri).await;
    assert_eq!(again.status(), StatusCode::GONE);

    let response = app.delete(&format!("{uri}?force=true")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let deleted = body_json(response).await;
    assert_eq!(deleted["deleted"], true);
    assert_eq!(deleted["previous"]["id"], post["id"]);

    let response = app.get_auth(&uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "rest_post_invalid_id");
}

#[tokio::test]
async fn invalid_json_body_is_rejected() {
    let app = TestApp::new();
    let response = app
        .request(
            Request::post("/wp-json/wp/v2/documentation")
                .header(header::AUTHORIZATION, wordepress_test_utils::basic_auth())
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "rest_invalid_json");
}
