//! Error types for edgeport.
//!
//! [`EdgeError`] covers the failures that abort a subcommand (bind,
//! file I/O, health probes). [`ProxyError`] explains a forwarded request
//! that got no upstream response and maps to 400, 502 or 504.
//! [`AuthError`] is the request-level failure of the session layer and
//! renders as a `{"success": false, ...}` envelope with a 401 or 400
//! status.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EdgeError {
    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("File already exists: {}", path.display())]
    FileExists { path: PathBuf },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(hyper::StatusCode),

    #[error("Config has {0} warning(s) and --strict was given")]
    StrictValidation(usize),
}

/// Why a proxied request produced no upstream response.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("invalid upstream URI '{0}'")]
    InvalidUri(String),

    #[error("failed to read request body: {0}")]
    RequestBody(#[source] axum::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read upstream response: {0}")]
    ResponseBody(#[from] hyper::Error),

    #[error("upstream timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl ProxyError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::RequestBody(_) => StatusCode::BAD_REQUEST,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::InvalidUri(_) | Self::Upstream(_) | Self::ResponseBody(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    BadRequest(&'static str),
}

impl AuthError {
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "error": { "message": self.to_string() },
        });
        (self.status(), Json(body)).into_response()
    }
}
