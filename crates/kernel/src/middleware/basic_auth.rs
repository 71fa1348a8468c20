//! HTTP Basic authentication middleware.
//!
//! Checks `Authorization: Basic <credentials>` against the configured API
//! user and password and marks the request as authenticated.

use std::convert::Infallible;

use axum::{
    body::Body,
    extract::{FromRequestParts, OptionalFromRequestParts, State},
    http::{Request, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::config::Config;
use crate::error::AppError;
use crate::state::AppState;

/// Marker extension set on requests carrying valid credentials.
///
/// As an extractor it rejects unauthenticated requests with 401; wrap it in
/// `Option` for endpoints where authentication is optional.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: String,
}

/// Middleware to authenticate HTTP Basic credentials.
///
/// Requests without Basic credentials pass through unmodified. Requests with
/// wrong credentials are rejected with 401.
pub async fn authenticate_basic(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let credentials = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
        .map(str::to_string);

    let Some(credentials) = credentials else {
        return next.run(request).await;
    };

    match verify(state.config(), &credentials) {
        Some(user) => {
            request.extensions_mut().insert(Authenticated { user });
            next.run(request).await
        }
        None => {
            debug!(path = %request.uri().path(), "invalid basic credentials");
            AppError::Unauthorized.into_response()
        }
    }
}

/// Decode and check `user:password`. Returns the user on success.
fn verify(config: &Config, encoded: &str) -> Option<String> {
    if config.api_password.is_empty() {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;

    let user_ok = user.as_bytes().ct_eq(config.api_user.as_bytes());
    let password_ok = password.as_bytes().ct_eq(config.api_password.as_bytes());
    bool::from(user_ok & password_ok).then(|| user.to_string())
}

impl<S: Send + Sync> FromRequestParts<S> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Authenticated>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for Authenticated {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Authenticated>().cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn config(password: &str) -> Config {
        Config {
            api_user: "admin".to_string(),
            api_password: password.to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn accepts_matching_credentials() {
        let encoded = STANDARD.encode("admin:secret");
        assert_eq!(verify(&config("secret"), &encoded).as_deref(), Some("admin"));
    }

    #[test]
    fn rejects_wrong_credentials() {
        let config = config("secret");
        assert!(verify(&config, &STANDARD.encode("admin:wrong")).is_none());
        assert!(verify(&config, &STANDARD.encode("root:secret")).is_none());
        assert!(verify(&config, &STANDARD.encode("no-colon")).is_none());
        assert!(verify(&config, "not base64!").is_none());
    }

    #[test]
    fn empty_password_rejects_everything() {
        assert!(verify(&config(""), &STANDARD.encode("admin:")).is_none());
    }
}
