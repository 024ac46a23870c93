//! Configuration for the oauth-relay service.
//!
//! Provides TOML-based configuration with:
//! - Config file layering (user config dir + project-local overrides)
//! - Client credential resolution (env var / `.env` → config file)
//! - Conversion into the exchange crate's [`ProviderConfig`](oauth_relay_exchange::ProviderConfig)

pub mod discovery;
pub mod error;
pub mod secrets;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, config_dir, load_config, load_config_file,
    load_config_with_options, user_config_path,
};
pub use error::{ConfigError, Result};
pub use secrets::{
    CLIENT_ID_ENV, CLIENT_SECRET_ENV, ResolvedCredentials, ResolvedSecret, SecretSource,
    load_dotenv, resolve_credentials, resolve_credentials_with,
};
pub use types::*;
