//! Identity provider token endpoint client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Serialize;

use crate::error::{ExchangeError, Result};
use crate::types::{AuthorizationCode, ClientCredentials, ProviderTokenResult};

/// GitHub's OAuth token endpoint.
pub const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

/// Upper bound on a single token endpoint call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and how to redeem codes.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub token_url: String,
    pub credentials: ClientCredentials,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ProviderConfig {
    /// Config for a GitHub OAuth app.
    pub fn github(credentials: ClientCredentials) -> Self {
        Self {
            token_url: GITHUB_TOKEN_URL.to_string(),
            credentials,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("oauth-relay/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ============================================================================
// TokenProvider Trait
// ============================================================================

/// Something that can redeem an authorization code.
#[async_trait]
pub trait TokenProvider: Send + Sync + std::fmt::Debug {
    /// Make exactly one redemption attempt for `code`.
    ///
    /// `Ok` covers both a granted token and an explicit provider rejection;
    /// `Err` is reserved for failures to get a usable answer at all.
    async fn redeem(&self, code: &AuthorizationCode) -> Result<ProviderTokenResult>;
}

/// Shared token provider for use across async contexts.
pub type SharedTokenProvider = Arc<dyn TokenProvider>;

// ============================================================================
// HttpTokenProvider
// ============================================================================

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// Redeems codes by POSTing JSON to the provider's token endpoint.
#[derive(Debug, Clone)]
pub struct HttpTokenProvider {
    client: Client,
    config: ProviderConfig,
}

impl HttpTokenProvider {
    /// Build a provider whose HTTP client enforces `config.timeout`.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ExchangeError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

#[async_trait]
impl TokenProvider for HttpTokenProvider {
    async fn redeem(&self, code: &AuthorizationCode) -> Result<ProviderTokenResult> {
        let request_body = TokenRequest {
            client_id: &self.config.credentials.client_id,
            client_secret: &self.config.credentials.client_secret,
            code: code.as_str(),
        };

        let response = self
            .client
            .post(&self.config.token_url)
            .header(header::ACCEPT, "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(
            status = %status.as_u16(),
            bytes = body.len(),
            "Token endpoint responded"
        );

        // Providers disagree on status codes for rejected codes (GitHub
        // answers 200), so the body decides.
        let value: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            ExchangeError::Internal(format!(
                "Failed to parse token response (HTTP {}): {}",
                status.as_u16(),
                e
            ))
        })?;

        ProviderTokenResult::from_json(&value)
    }
}
