#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Each test builds its own [`TestApp`] around the REAL kernel router and
//! state. The store is in memory, so apps are cheap and fully isolated.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use docs_api::DocsApiPlugin;
use wordepress_kernel::build_router;
use wordepress_kernel::config::Config;
use wordepress_kernel::state::AppState;
use wordepress_sdk::Plugin;
use wordepress_test_utils::{TEST_PASSWORD, TEST_USER, TestDoc, basic_auth};

/// Test application wrapper using the REAL kernel routes and state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Kernel with the docs plugin registered and activated.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Kernel with the docs plugin registered but never activated.
    pub fn inactive() -> Self {
        Self::with_config(Config {
            activate_plugins: Some(Vec::new()),
            ..test_config()
        })
    }

    /// Kernel persisting plugin status to `state_file`.
    pub fn with_state_file(state_file: PathBuf) -> Self {
        Self::with_config(Config {
            state_file: Some(state_file),
            ..test_config()
        })
    }

    pub fn with_config(config: Config) -> Self {
        let plugins: Vec<Arc<dyn Plugin>> = vec![Arc::new(DocsApiPlugin)];
        let state = AppState::bootstrap(config, plugins).expect("Failed to bootstrap AppState");
        let router = build_router(state.clone());
        Self { router, state }
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// Anonymous GET.
    pub async fn get(&self, uri: &str) -> Response {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Authenticated GET.
    pub async fn get_auth(&self, uri: &str) -> Response {
        self.request(
            Request::get(uri)
                .header(header::AUTHORIZATION, basic_auth())
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Authenticated request with a JSON body.
    pub async fn send_json(&self, method: &str, uri: &str, body: &Value) -> Response {
        self.request(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, basic_auth())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Authenticated DELETE.
    pub async fn delete(&self, uri: &str) -> Response {
        self.request(
            Request::delete(uri)
                .header(header::AUTHORIZATION, basic_auth())
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Authenticated empty POST.
    pub async fn post_empty(&self, uri: &str) -> Response {
        self.request(
            Request::post(uri)
                .header(header::AUTHORIZATION, basic_auth())
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Create a post through REST, asserting 201, and return its JSON.
    pub async fn create(&self, rest_base: &str, doc: &TestDoc) -> Value {
        let response = self
            .send_json("POST", &format!("/wp-json/wp/v2/{rest_base}"), &doc.to_json())
            .await;
        assert_eq!(response.status(), StatusCode::CREATED, "create failed");
        body_json(response).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration accepting the shared test credentials.
pub fn test_config() -> Config {
    Config {
        api_user: TEST_USER.to_string(),
        api_password: TEST_PASSWORD.to_string(),
        ..Config::default()
    }
}

/// Extract response body as a string.
pub async fn body_string(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect body")
        .to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

/// Extract response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let text = body_string(response).await;
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("invalid JSON ({e}): {text}"))
}
