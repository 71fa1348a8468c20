//! Application error types.
//!
//! Errors render as REST error objects: `{"code", "message", "data": {"status"}}`.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    #[error("Sorry, you are not allowed to do that.")]
    Unauthorized,

    #[error("{message}")]
    BadRequest { code: &'static str, message: String },

    #[error("{message}")]
    Gone { code: &'static str, message: String },
}

impl AppError {
    /// No route matched the request path and method.
    pub fn no_route() -> Self {
        Self::NotFound {
            code: "rest_no_route",
            message: "No route was found matching the URL and request method.".to_string(),
        }
    }

    /// A post id that does not exist for the requested type.
    pub fn invalid_post_id() -> Self {
        Self::NotFound {
            code: "rest_post_invalid_id",
            message: "Invalid post ID.".to_string(),
        }
    }

    /// A request parameter failed validation.
    pub fn invalid_param(message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: "rest_invalid_param",
            message: message.into(),
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Gone { .. } => StatusCode::GONE,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Internal(_) => "internal_server_error",
            AppError::NotFound { code, .. }
            | AppError::BadRequest { code, .. }
            | AppError::Gone { code, .. } => *code,
            AppError::Unauthorized => "rest_forbidden",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details are logged, never returned
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "code": self.code(),
            "message": message,
            "data": { "status": status.as_u16() },
        }));

        if matches!(self, AppError::Unauthorized) {
            (
                status,
                [(header::WWW_AUTHENTICATE, "Basic realm=\"wordepress\"")],
                body,
            )
                .into_response()
        } else {
            (status, body).into_response()
        }
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_variants() {
        assert_eq!(AppError::no_route().status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::invalid_post_id().status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::invalid_param("bad page").status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn unauthorized_challenges_basic_auth() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    #[test]
    fn codes_are_rest_style() {
        assert_eq!(AppError::no_route().code(), "rest_no_route");
        assert_eq!(AppError::invalid_post_id().code(), "rest_post_invalid_id");
    }
}
