//! Route handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
};
use oauth_relay_exchange::{AccessToken, ExchangeError};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Path of the exchange endpoint.
pub const AUTH_PATH: &str = "/api/auth";

/// Successful exchange response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExchangeResponse {
    pub access_token: AccessToken,
}

/// Handle `POST /api/auth`.
///
/// The body is buffered in full before it is parsed.
pub async fn exchange_handler(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<ExchangeResponse>> {
    let body = body.map_err(|e| {
        ExchangeError::InvalidRequest(format!("Failed to read request body: {}", e.body_text()))
    })?;

    let access_token = state.relay.exchange_body(&body).await?;

    Ok(Json(ExchangeResponse { access_token }))
}

/// Everything that isn't `POST /api/auth`.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
