//! Values that flow through a single exchange.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ExchangeError, Result};

/// Message returned when a request carries no usable code.
pub const CODE_REQUIRED: &str = "Code is required";

// ─────────────────────────────────────────────────────────────────────────────
// AuthorizationCode
// ─────────────────────────────────────────────────────────────────────────────

/// A non-empty authorization code supplied by the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationCode(String);

impl AuthorizationCode {
    /// Validate a raw code. Empty strings are rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(ExchangeError::InvalidRequest(CODE_REQUIRED.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Extract the `code` field from a decoded request body.
    ///
    /// Anything other than a non-empty string (absent, `null`, a number,
    /// a non-object body) counts as missing.
    pub fn from_request(body: &Value) -> Result<Self> {
        match body.get("code").and_then(Value::as_str) {
            Some(code) => Self::parse(code),
            None => Err(ExchangeError::InvalidRequest(CODE_REQUIRED.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthorizationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthorizationCode(<redacted>)")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AccessToken
// ─────────────────────────────────────────────────────────────────────────────

/// An opaque access token, passed through exactly as the provider issued it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ClientCredentials
// ─────────────────────────────────────────────────────────────────────────────

/// Confidential client credentials registered with the provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ProviderTokenResult
// ─────────────────────────────────────────────────────────────────────────────

/// What the provider said about a code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderTokenResult {
    /// The code was accepted.
    Granted(AccessToken),
    /// The provider refused the code.
    Rejected {
        error: String,
        error_description: Option<String>,
    },
}

impl ProviderTokenResult {
    /// Interpret a decoded token endpoint response.
    ///
    /// An `error` field wins over everything else. Without one, the body
    /// must carry a string `access_token`; any other shape is an internal
    /// error rather than an empty token.
    pub fn from_json(body: &Value) -> Result<Self> {
        let object = body.as_object().ok_or_else(|| {
            ExchangeError::Internal(format!(
                "Unexpected token response: expected a JSON object, got {}",
                json_kind(body)
            ))
        })?;

        let error = match object.get("error") {
            None | Some(Value::Null) | Some(Value::Bool(false)) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };

        if let Some(error) = error {
            let error_description = object
                .get("error_description")
                .and_then(Value::as_str)
                .filter(|d| !d.is_empty())
                .map(str::to_string);
            return Ok(ProviderTokenResult::Rejected {
                error,
                error_description,
            });
        }

        match object.get("access_token").and_then(Value::as_str) {
            Some(token) => Ok(ProviderTokenResult::Granted(AccessToken::new(token))),
            None => Err(ExchangeError::Internal(
                "Unexpected token response: neither access_token nor error present".to_string(),
            )),
        }
    }

    /// Collapse into the exchange outcome.
    ///
    /// A rejection surfaces the description when present, else the code.
    pub fn into_result(self) -> Result<AccessToken> {
        match self {
            ProviderTokenResult::Granted(token) => Ok(token),
            ProviderTokenResult::Rejected {
                error,
                error_description,
            } => Err(ExchangeError::ProviderRejected(
                error_description.unwrap_or(error),
            )),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
