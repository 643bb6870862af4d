//! Error types for the proxy service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

/// Errors produced before or while reaching the upstream service.
///
/// Upstream responses with non-success status codes are not errors: they are
/// relayed verbatim to the caller. Only local validation, missing
/// configuration, and transport failures surface here.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// A required identifier or field is empty or missing
    #[error("{0}")]
    Validation(String),

    /// Required configuration is absent at call time
    #[error("{0}")]
    Configuration(String),

    /// Transport-level failure reaching the upstream service
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ProxyError {
    /// HTTP status this error maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Configuration(_) => StatusCode::BAD_REQUEST,
            Self::Http(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
