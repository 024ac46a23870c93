//! Error types for the server.
//!
//! This is the only place exchange outcomes become HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use oauth_relay_exchange::ExchangeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level message for 500 responses; the specifics go in `details`.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The exchange failed.
    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    /// No such route.
    #[error("Not found")]
    NotFound,

    /// Server-side failure outside the exchange (binding, serving).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Diagnostic detail, only on 500s.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        // Internal exchange failures are logged by the relay
        if let ServerError::Exchange(e) = &self
            && e.is_client_error()
        {
            tracing::warn!(error = %e, "Client error");
        } else if let ServerError::Internal(details) = &self {
            tracing::error!(details = %details, "Server error");
        }

        let (status, body) = match self {
            ServerError::Exchange(
                ExchangeError::InvalidRequest(message) | ExchangeError::ProviderRejected(message),
            ) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: message,
                    details: None,
                },
            ),
            ServerError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: "Not found".to_string(),
                    details: None,
                },
            ),
            ServerError::Exchange(ExchangeError::Internal(details))
            | ServerError::Internal(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: INTERNAL_ERROR_MESSAGE.to_string(),
                    details: Some(details),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}
