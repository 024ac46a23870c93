//! CORS and request logging middleware.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Method, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;

use crate::state::AppState;

/// `Access-Control-Allow-Origin` value.
pub const ALLOW_ORIGIN: &str = "*";

/// `Access-Control-Allow-Methods` value.
pub const ALLOW_METHODS: &str = "POST, OPTIONS";

/// `Access-Control-Allow-Headers` value.
pub const ALLOW_HEADERS: &str = "Content-Type";

/// Permissive CORS for browser callers.
///
/// Every `OPTIONS` request is answered here with an empty 200, whatever the
/// path. All responses, including errors, carry the CORS headers.
pub async fn cors_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );

    response
}

/// Logs one line per request: method, path, status and elapsed time.
///
/// Bodies stay out of the log; they carry codes and tokens.
pub async fn request_logging_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.config.request_logging {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match status {
        500.. => tracing::error!(%method, %path, status, elapsed_ms, "Request failed"),
        400..=499 => tracing::warn!(%method, %path, status, elapsed_ms, "Request rejected"),
        _ => tracing::info!(%method, %path, status, elapsed_ms, "Request served"),
    }

    response
}
