//! Configuration types.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use oauth_relay_exchange::{ClientCredentials, GITHUB_TOKEN_URL, ProviderConfig};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default cap on inbound request bodies. A code request is tiny.
pub const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024;

/// Default token endpoint timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Placeholder printed instead of secret values.
pub const REDACTED: &str = "<redacted>";

// ─────────────────────────────────────────────────────────────────────────────
// Root
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration. Every section is optional so layers can be partial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// `[server]` section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerSection>,

    /// `[provider]` section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderSection>,
}

impl RelayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: RelayConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }

        if other.provider.is_some() {
            self.provider = other.provider;
        }
    }

    /// Effective server settings.
    pub fn server(&self) -> ServerSection {
        self.server.clone().unwrap_or_default()
    }

    /// Effective provider settings.
    pub fn provider(&self) -> ProviderSection {
        self.provider.clone().unwrap_or_default()
    }

    /// A copy safe to print: the client secret is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if let Some(provider) = copy.provider.as_mut()
            && provider.client_secret.is_some()
        {
            provider.client_secret = Some(REDACTED.to_string());
        }
        copy
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────────────────────────────────────

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Address to bind to.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
    /// Log every request.
    pub request_logging: bool,
    /// Maximum accepted request body in bytes.
    pub max_body_size: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            request_logging: true,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl ServerSection {
    /// Combine `bind` and `port` into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.bind.parse().map_err(|e| ConfigError::Invalid {
            field: "server.bind".to_string(),
            reason: format!("'{}' is not an IP address: {}", self.bind, e),
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────────────────────────────────────

/// `[provider]` section.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    /// Token endpoint URL.
    pub token_url: String,
    /// Timeout for one token endpoint call, in seconds.
    pub timeout_secs: u64,
    /// OAuth app client id. The environment takes precedence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// OAuth app client secret. Prefer the environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            token_url: GITHUB_TOKEN_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            client_id: None,
            client_secret: None,
        }
    }
}

impl std::fmt::Debug for ProviderSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSection")
            .field("token_url", &self.token_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| REDACTED))
            .finish()
    }
}

impl ProviderSection {
    /// Whether the secret is stored in the config file in plaintext.
    pub fn has_plaintext_secret(&self) -> bool {
        self.client_secret.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Build the exchange crate's provider config.
    pub fn provider_config(&self, credentials: ClientCredentials) -> Result<ProviderConfig> {
        if !(self.token_url.starts_with("https://") || self.token_url.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                field: "provider.token_url".to_string(),
                reason: format!("'{}' is not an http(s) URL", self.token_url),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "provider.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(ProviderConfig::github(credentials)
            .with_token_url(self.token_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }
}
