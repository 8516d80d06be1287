//! Error types for company profile operations

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Company profile specific errors
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Request body has no usable `company_name`
    #[error("Missing company_name in request body")]
    MissingCompanyName,

    /// Request body is present but malformed
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    /// Upstream answered with a non-success status
    #[error("{provider} returned HTTP {status}")]
    UpstreamStatus {
        provider: &'static str,
        status: u16,
    },

    /// Upstream answered, but not with the payload we expected
    #[error("Unexpected {provider} payload: {reason}")]
    UpstreamPayload {
        provider: &'static str,
        reason: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl ProfileError {
    pub(crate) fn payload(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::UpstreamPayload {
            provider,
            reason: reason.into(),
        }
    }

    /// HTTP status this error maps to at the request boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCompanyName => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the `error` field of the response body
    pub fn public_message(&self) -> String {
        match self {
            Self::MissingCompanyName => self.to_string(),
            other => format!("An error occurred: {other}"),
        }
    }
}

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for profile operations
pub type Result<T> = std::result::Result<T, ProfileError>;
