//! HTTP surface for the oauth-relay token exchange.
//!
//! Exposes a single `POST /api/auth` endpoint that trades an authorization
//! code for an access token. Everything else is a 404, except `OPTIONS`
//! which is answered as a CORS preflight on any path.
//!
//! # Example
//!
//! ```ignore
//! use oauth_relay_exchange::{ClientCredentials, ProviderConfig, Relay};
//! use oauth_relay_server::{Server, ServerConfig};
//!
//! let provider = ProviderConfig::github(ClientCredentials::new(id, secret));
//! let relay = Relay::from_config(provider)?;
//! let server = Server::new(relay, ServerConfig::new());
//! server.run().await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{ErrorResponse, Result, ServerError};
pub use routes::ExchangeResponse;
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;

use axum::{Router, extract::DefaultBodyLimit, routing::post};
use oauth_relay_exchange::Relay;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The relay's HTTP server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server with the given relay and configuration.
    pub fn new(relay: Relay, config: ServerConfig) -> Self {
        Self {
            state: AppState::new(relay, config),
        }
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            .route(
                routes::AUTH_PATH,
                post(routes::exchange_handler).fallback(routes::not_found),
            )
            .fallback(routes::not_found)
            .layer(DefaultBodyLimit::max(self.state.config.max_body_size))
            // Request logging sees the final status, CORS preflights included
            .layer(axum::middleware::from_fn_with_state(
                self.state.clone(),
                middleware::request_logging_middleware,
            ))
            .layer(axum::middleware::from_fn(middleware::cors_middleware))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server until the process exits.
    pub async fn run(self) -> Result<()> {
        self.run_with_shutdown(std::future::pending::<()>()).await
    }

    /// Run the server until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_with_shutdown(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let listener = self.bind().await?;
        let router = self.router();

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        info!("Server stopped");
        Ok(())
    }

    /// Bind and serve in a background task, returning the bound address.
    ///
    /// Binding to port 0 picks a free port.
    pub async fn spawn(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<SocketAddr> {
        let listener = self.bind().await?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::Internal(format!("Failed to read local address: {}", e)))?;
        let router = self.router();

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!(error = %e, "Server task failed");
            }
        });

        Ok(local_addr)
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }

    async fn bind(&self) -> Result<TcpListener> {
        let addr = self.state.config.bind_address;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

        if let Ok(local_addr) = listener.local_addr() {
            info!(addr = %local_addr, endpoint = routes::AUTH_PATH, "Starting OAuth relay server");
        }
        Ok(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use oauth_relay_exchange::{
        AccessToken, AuthorizationCode, ExchangeError, ProviderTokenResult, TokenProvider,
    };
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tower::ServiceExt;
    use tracing_test::traced_test;

    #[derive(Debug)]
    struct StubProvider {
        answer: oauth_relay_exchange::Result<ProviderTokenResult>,
        calls: AtomicU32,
    }

    #[async_trait]
    impl TokenProvider for StubProvider {
        async fn redeem(
            &self,
            _code: &AuthorizationCode,
        ) -> oauth_relay_exchange::Result<ProviderTokenResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    fn server_with(
        answer: oauth_relay_exchange::Result<ProviderTokenResult>,
    ) -> (Server, Arc<StubProvider>) {
        let stub = Arc::new(StubProvider {
            answer,
            calls: AtomicU32::new(0),
        });
        let relay = Relay::new(stub.clone());
        let config = ServerConfig::new().with_request_logging(false);
        (Server::new(relay, config), stub)
    }

    fn granted(token: &str) -> oauth_relay_exchange::Result<ProviderTokenResult> {
        Ok(ProviderTokenResult::Granted(AccessToken::new(token)))
    }

    fn post_auth(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/auth")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(
        server: &Server,
        request: Request<Body>,
    ) -> (StatusCode, header::HeaderMap, String) {
        let response = server.router().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_success_returns_token_verbatim() {
        let (server, stub) = server_with(granted("abc123"));
        let (status, headers, body) = send(&server, post_auth(r#"{"code":"xyz"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"access_token":"abc123"}"#);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_code_is_400_without_provider_call() {
        let (server, stub) = server_with(granted("unused"));

        for body in [r#"{}"#, r#"{"code":""}"#, r#"{"state":"abc"}"#] {
            let (status, _, response) = send(&server, post_auth(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response, r#"{"error":"Code is required"}"#);
        }
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_rejected_request_warns_without_request_logging() {
        let (server, _) = server_with(granted("unused"));
        let (status, _, _) = send(&server, post_auth(r#"{"code":""}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(logs_contain("WARN"));
        assert!(logs_contain("Code is required"));
        assert!(!logs_contain("Request rejected"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_request_logging_records_status() {
        let stub = Arc::new(StubProvider {
            answer: granted("unused"),
            calls: AtomicU32::new(0),
        });
        let server = Server::new(Relay::new(stub), ServerConfig::new());
        let request = Request::builder()
            .method("GET")
            .uri("/elsewhere")
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(&server, request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(logs_contain("Request rejected"));
        assert!(logs_contain("/elsewhere"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_400_without_provider_call() {
        let (server, stub) = server_with(granted("unused"));
        let (status, _, body) = send(&server, post_auth("{\"code\": ")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON"));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_content_type_is_not_required() {
        let (server, _) = server_with(granted("abc123"));
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth")
            .body(Body::from(r#"{"code":"xyz"}"#))
            .unwrap();
        let (status, _, _) = send(&server, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_provider_rejection_with_description() {
        let (server, _) = server_with(Ok(ProviderTokenResult::Rejected {
            error: "bad_verification_code".to_string(),
            error_description: Some("The code passed is incorrect or expired.".to_string()),
        }));
        let (status, _, body) = send(&server, post_auth(r#"{"code":"old"}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"error":"The code passed is incorrect or expired."}"#);
    }

    #[tokio::test]
    async fn test_provider_rejection_without_description() {
        let (server, _) = server_with(Ok(ProviderTokenResult::Rejected {
            error: "bad_verification_code".to_string(),
            error_description: None,
        }));
        let (status, _, body) = send(&server, post_auth(r#"{"code":"old"}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"error":"bad_verification_code"}"#);
    }

    #[tokio::test]
    async fn test_provider_failure_is_500_with_details() {
        let (server, _) = server_with(Err(ExchangeError::Internal(
            "Token endpoint request failed: connection refused".to_string(),
        )));
        let (status, headers, body) = send(&server, post_auth(r#"{"code":"abc"}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"], "Internal server error");
        assert!(!body["details"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_options_anywhere_is_empty_200() {
        let (server, stub) = server_with(granted("unused"));

        for uri in ["/api/auth", "/", "/some/other/path"] {
            let request = Request::builder()
                .method("OPTIONS")
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let (status, headers, body) = send(&server, request).await;

            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert!(body.is_empty());
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
        }
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_paths_and_methods_are_404() {
        let (server, _) = server_with(granted("unused"));
        let cases = [
            ("GET", "/"),
            ("POST", "/api/other"),
            ("GET", "/api/auth"),
            ("DELETE", "/api/auth"),
            ("POST", "/api/auth/extra"),
            ("GET", "/health"),
        ];

        for (method, uri) in cases {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let (status, headers, body) = send(&server, request).await;

            assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
            assert_eq!(body, r#"{"error":"Not found"}"#);
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        }
    }

    #[tokio::test]
    async fn test_oversized_body_is_400() {
        let stub = Arc::new(StubProvider {
            answer: granted("unused"),
            calls: AtomicU32::new(0),
        });
        let config = ServerConfig::new()
            .with_request_logging(false)
            .with_max_body_size(16);
        let server = Server::new(Relay::new(stub.clone()), config);

        let padding = "x".repeat(64);
        let (status, _, body) =
            send(&server, post_auth(&format!(r#"{{"code":"{}"}}"#, padding))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Failed to read request body"));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_same_code_twice_calls_provider_twice() {
        let (server, stub) = server_with(granted("abc123"));

        send(&server, post_auth(r#"{"code":"once"}"#)).await;
        send(&server, post_auth(r#"{"code":"once"}"#)).await;
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }
}
