//! The exchange operation: validate, redeem once, interpret.

use std::sync::Arc;

use crate::error::{ExchangeError, Result};
use crate::provider::{HttpTokenProvider, ProviderConfig, SharedTokenProvider};
use crate::types::{AccessToken, AuthorizationCode};

/// Exchanges authorization codes for access tokens through a provider.
///
/// Holds no per-request state; a single instance serves all requests.
#[derive(Debug, Clone)]
pub struct Relay {
    provider: SharedTokenProvider,
}

impl Relay {
    pub fn new(provider: SharedTokenProvider) -> Self {
        Self { provider }
    }

    /// Create a relay backed by the HTTP token endpoint client.
    pub fn from_config(config: ProviderConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTokenProvider::new(config)?)))
    }

    /// Exchange the code carried in a raw JSON request body.
    ///
    /// The body must already be fully buffered. Malformed JSON and a
    /// missing code both fail before the provider is contacted.
    pub async fn exchange_body(&self, body: &[u8]) -> Result<AccessToken> {
        let request: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| ExchangeError::InvalidRequest(format!("Invalid JSON: {}", e)))?;
        let code = AuthorizationCode::from_request(&request)?;
        self.exchange_code(&code).await
    }

    /// Exchange a raw code string.
    pub async fn exchange(&self, code: &str) -> Result<AccessToken> {
        let code = AuthorizationCode::parse(code)?;
        self.exchange_code(&code).await
    }

    /// Exchange an already validated code. Issues exactly one provider call.
    pub async fn exchange_code(&self, code: &AuthorizationCode) -> Result<AccessToken> {
        let outcome = self.provider.redeem(code).await.and_then(|r| r.into_result());

        match &outcome {
            Ok(_) => tracing::info!("Authorization code exchanged"),
            Err(ExchangeError::ProviderRejected(message)) => {
                tracing::warn!(reason = %message, "Provider rejected authorization code");
            }
            Err(e) => tracing::error!(error = %e, "Token exchange failed"),
        }

        outcome
    }
}
