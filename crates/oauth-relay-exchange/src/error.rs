//! Error types for the token exchange.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, ExchangeError>;

/// The ways a token exchange can fail.
///
/// Display strings are the bare message; callers decide how to frame them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExchangeError {
    /// The caller's request was malformed or carried no code.
    /// The provider was not contacted.
    #[error("{0}")]
    InvalidRequest(String),

    /// The provider answered with an explicit error for this code.
    #[error("{0}")]
    ProviderRejected(String),

    /// Network failure, timeout or an unexpected provider response.
    #[error("{0}")]
    Internal(String),
}

impl ExchangeError {
    /// Whether the failure is attributable to the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ExchangeError::InvalidRequest(_) | ExchangeError::ProviderRejected(_)
        )
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ExchangeError::Internal(format!("Token endpoint timed out: {}", e))
        } else {
            ExchangeError::Internal(format!("Token endpoint request failed: {}", e))
        }
    }
}
