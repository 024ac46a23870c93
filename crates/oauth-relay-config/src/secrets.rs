//! Client credential resolution.
//!
//! Resolution order per value:
//! 1. Environment variable (a `.env` file in the working directory is
//!    loaded into the environment first, without overriding existing vars)
//! 2. Config file (`[provider]` section)
//!
//! Empty values are treated as absent.

use std::fmt;
use std::path::PathBuf;

use oauth_relay_exchange::ClientCredentials;

use crate::error::{ConfigError, Result};
use crate::types::{ProviderSection, REDACTED};

/// Environment variable holding the OAuth app client id.
pub const CLIENT_ID_ENV: &str = "GITHUB_CLIENT_ID";

/// Environment variable holding the OAuth app client secret.
pub const CLIENT_SECRET_ENV: &str = "GITHUB_CLIENT_SECRET";

/// A resolved value with provenance.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The value.
    pub value: String,
    /// Where the value was found.
    pub source: SecretSource,
}

impl fmt::Debug for ResolvedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedSecret")
            .field("value", &REDACTED)
            .field("source", &self.source)
            .finish()
    }
}

/// Where a value was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variable (possibly populated from `.env`).
    EnvVar(String),
    /// Config file.
    ConfigFile,
}

impl fmt::Display for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::ConfigFile => write!(f, "config file"),
        }
    }
}

/// Both credentials plus where each came from.
#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    pub credentials: ClientCredentials,
    pub client_id_source: SecretSource,
    pub client_secret_source: SecretSource,
}

/// Load `.env` from the working directory (or a parent) into the process
/// environment. Returns the file used, if any.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenv::dotenv().ok()
}

/// Resolve credentials from the process environment and `section`.
pub fn resolve_credentials(section: &ProviderSection) -> Result<ResolvedCredentials> {
    resolve_credentials_with(section, |key| std::env::var(key).ok())
}

/// Resolve credentials with an explicit environment lookup.
pub fn resolve_credentials_with<F>(section: &ProviderSection, lookup: F) -> Result<ResolvedCredentials>
where
    F: Fn(&str) -> Option<String>,
{
    let client_id = resolve_value(&lookup, CLIENT_ID_ENV, section.client_id.as_deref()).ok_or(
        ConfigError::MissingCredential {
            field: "client_id",
            env_var: CLIENT_ID_ENV,
        },
    )?;
    let client_secret =
        resolve_value(&lookup, CLIENT_SECRET_ENV, section.client_secret.as_deref()).ok_or(
            ConfigError::MissingCredential {
                field: "client_secret",
                env_var: CLIENT_SECRET_ENV,
            },
        )?;

    Ok(ResolvedCredentials {
        credentials: ClientCredentials::new(client_id.value, client_secret.value),
        client_id_source: client_id.source,
        client_secret_source: client_secret.source,
    })
}

fn resolve_value<F>(lookup: &F, env_var: &str, config_value: Option<&str>) -> Option<ResolvedSecret>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(env_var)
        && !value.is_empty()
    {
        return Some(ResolvedSecret {
            value,
            source: SecretSource::EnvVar(env_var.to_string()),
        });
    }

    config_value
        .filter(|v| !v.is_empty())
        .map(|v| ResolvedSecret {
            value: v.to_string(),
            source: SecretSource::ConfigFile,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_resolution() {
        let resolved = resolve_credentials_with(
            &ProviderSection::default(),
            env(&[(CLIENT_ID_ENV, "env-id"), (CLIENT_SECRET_ENV, "env-secret")]),
        )
        .unwrap();

        assert_eq!(resolved.credentials.client_id, "env-id");
        assert_eq!(resolved.credentials.client_secret, "env-secret");
        assert_eq!(
            resolved.client_secret_source,
            SecretSource::EnvVar(CLIENT_SECRET_ENV.to_string())
        );
    }

    #[test]
    fn test_env_beats_config_file() {
        let section = ProviderSection {
            client_id: Some("file-id".to_string()),
            client_secret: Some("file-secret".to_string()),
            ..Default::default()
        };
        let resolved =
            resolve_credentials_with(&section, env(&[(CLIENT_ID_ENV, "env-id")])).unwrap();

        assert_eq!(resolved.credentials.client_id, "env-id");
        assert_eq!(resolved.credentials.client_secret, "file-secret");
        assert_eq!(resolved.client_secret_source, SecretSource::ConfigFile);
    }

    #[test]
    fn test_empty_env_falls_through() {
        let section = ProviderSection {
            client_id: Some("file-id".to_string()),
            ..Default::default()
        };
        let resolved = resolve_credentials_with(
            &section,
            env(&[(CLIENT_ID_ENV, ""), (CLIENT_SECRET_ENV, "env-secret")]),
        )
        .unwrap();
        assert_eq!(resolved.credentials.client_id, "file-id");
    }

    #[test]
    fn test_missing_credentials_are_fatal() {
        let err = resolve_credentials_with(&ProviderSection::default(), env(&[])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingCredential {
                field: "client_id",
                ..
            }
        ));
        assert!(err.to_string().contains(CLIENT_ID_ENV));

        let err = resolve_credentials_with(
            &ProviderSection::default(),
            env(&[(CLIENT_ID_ENV, "id"), (CLIENT_SECRET_ENV, "")]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingCredential {
                field: "client_secret",
                ..
            }
        ));
    }

    #[test]
    fn test_resolved_secret_debug_redacts() {
        let secret = ResolvedSecret {
            value: "hunter2".to_string(),
            source: SecretSource::ConfigFile,
        };
        assert!(!format!("{:?}", secret).contains("hunter2"));
        assert_eq!(SecretSource::ConfigFile.to_string(), "config file");
    }
}
