//! Common test utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tokio::sync::oneshot;
use wiremock::MockServer;

use oauth_relay_exchange::{ClientCredentials, ProviderConfig, Relay};
use oauth_relay_server::{Server, ServerConfig};

/// Path the mock identity provider serves its token endpoint on.
pub const TOKEN_PATH: &str = "/login/oauth/access_token";

/// A relay running in the background in front of a mock identity provider.
pub struct TestRelay {
    /// The relay's address.
    pub addr: SocketAddr,
    /// The mock identity provider.
    pub provider: MockServer,
    /// HTTP client for talking to the relay.
    pub client: Client,
    /// Dropping this stops the relay.
    _shutdown: oneshot::Sender<()>,
}

impl TestRelay {
    /// Start a relay against a fresh mock provider.
    pub async fn start() -> Result<Self> {
        let provider = MockServer::start().await;
        let token_url = format!("{}{}", provider.uri(), TOKEN_PATH);
        Self::start_with_token_url(provider, token_url, Duration::from_secs(5)).await
    }

    /// Start a relay pointed at an arbitrary token URL.
    pub async fn start_with_token_url(
        provider: MockServer,
        token_url: String,
        timeout: Duration,
    ) -> Result<Self> {
        let provider_config =
            ProviderConfig::github(ClientCredentials::new("test-client-id", "test-client-secret"))
                .with_token_url(token_url)
                .with_timeout(timeout);
        let relay = Relay::from_config(provider_config)?;

        let config = ServerConfig::new()
            .with_bind_address("127.0.0.1:0".parse()?)
            .with_request_logging(false);

        let (tx, rx) = oneshot::channel::<()>();
        let addr = Server::new(relay, config)
            .spawn(async move {
                let _ = rx.await;
            })
            .await?;

        Ok(Self {
            addr,
            provider,
            client: Client::new(),
            _shutdown: tx,
        })
    }

    /// Get the base URL for the relay.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// POST a raw body to the exchange endpoint.
    pub async fn post_auth(&self, body: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}/api/auth", self.base_url()))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await?)
    }

    /// Number of requests the mock provider has received.
    pub async fn provider_calls(&self) -> usize {
        self.provider
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or(0)
    }
}

/// An address with nothing listening on it.
pub fn unused_addr() -> Result<SocketAddr> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}
