use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the analysis operations and the HTTP layer.
///
/// LLM failures are deliberately absent: they degrade to fallback text inside
/// the analyzer and never become errors. File-content fetch failures degrade
/// to an empty string inside the GitHub client.
#[derive(Debug, Error)]
pub enum RepolensError {
    /// A required request field is missing or empty. Maps to HTTP 400.
    #[error("{0}")]
    InvalidInput(String),

    /// The supplied repository URL could not be resolved to `owner/repo`.
    #[error("{0}")]
    InvalidRepositoryReference(String),

    /// GitHub answered with a non-2xx status.
    #[error("GitHub {what} fetch failed: {status}")]
    Upstream { what: &'static str, status: u16 },

    /// The request never produced a response (DNS, connect, body errors).
    #[error("GitHub request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, RepolensError>;

impl IntoResponse for RepolensError {
    fn into_response(self) -> Response {
        let status = match self {
            RepolensError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
