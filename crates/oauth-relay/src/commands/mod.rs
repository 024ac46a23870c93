//! CLI command handlers.

pub mod config;
pub mod start;

use std::path::Path;

use anyhow::Result;
use oauth_relay_config::LoadedConfig;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Verbose output enabled.
    pub verbose: bool,
}

/// Load an explicit config file, or discover and layer the defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let loaded = match explicit {
        Some(path) => LoadedConfig::from_file(path)?,
        None => oauth_relay_config::load_config(None)?,
    };

    for warning in &loaded.warnings {
        eprintln!("warning: {}", warning);
    }

    Ok(loaded)
}
