//! OAuth authorization code exchange.
//!
//! Trades a short-lived authorization code, together with the service's
//! confidential client credentials, for an access token at an identity
//! provider's token endpoint. The client secret never leaves this process.
//!
//! # Components
//!
//! - [`types`] — codes, tokens, credentials and the provider's reply shapes
//! - [`provider`] — the [`TokenProvider`] seam and its reqwest implementation
//! - [`relay`] — request validation and outcome mapping around a provider

pub mod error;
pub mod provider;
pub mod relay;
pub mod types;

pub use error::{ExchangeError, Result};
pub use provider::{
    DEFAULT_TIMEOUT, GITHUB_TOKEN_URL, HttpTokenProvider, ProviderConfig, SharedTokenProvider,
    TokenProvider,
};
pub use relay::Relay;
pub use types::{AccessToken, AuthorizationCode, ClientCredentials, ProviderTokenResult};
