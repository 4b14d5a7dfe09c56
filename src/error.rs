//! Error types for GitVal
//!
//! All handler errors are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
///
/// Each variant maps to a fixed status code and a human-readable
/// `{"error": ...}` body. Upstream detail carried by a variant is for
/// logs only and never reaches the client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Callback request without an authorization code (400)
    #[error("Code not found")]
    MissingCode,

    /// Token endpoint rejected the code or could not be reached (500)
    #[error("OAuth exchange failed: {0}")]
    TokenExchange(String),

    /// Profile request failed at the transport level (500)
    #[error("Failed to fetch user: {0}")]
    FetchUser(#[from] reqwest::Error),

    /// Profile body was not a JSON object (500)
    #[error("Failed to parse user data: {0}")]
    ParseUser(String),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// Status code, client-facing message and metric label for this error
    fn parts(&self) -> (StatusCode, String, &'static str) {
        match self {
            AppError::MissingCode => (
                StatusCode::BAD_REQUEST,
                "Code not found".to_string(),
                "missing_code",
            ),
            AppError::TokenExchange(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "OAuth exchange failed".to_string(),
                "token_exchange",
            ),
            AppError::FetchUser(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch user".to_string(),
                "fetch_user",
            ),
            AppError::ParseUser(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to parse user data".to_string(),
                "parse_user",
            ),
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), "config"),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "internal",
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, error_message, error_type) = self.parts();

        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[error_type]).inc();

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body can be read");
        serde_json::from_slice(&bytes).expect("body is json")
    }

    #[tokio::test]
    async fn missing_code_is_bad_request() {
        let response = AppError::MissingCode.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Code not found" })
        );
    }

    #[tokio::test]
    async fn upstream_detail_is_not_leaked() {
        let response = AppError::TokenExchange("bad_verification_code".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "OAuth exchange failed" })
        );

        let response = AppError::ParseUser("expected value at line 1".to_string()).into_response();
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Failed to parse user data" })
        );
    }

    #[tokio::test]
    async fn internal_error_hides_cause() {
        let response = AppError::Internal(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Internal server error" })
        );
    }
}
