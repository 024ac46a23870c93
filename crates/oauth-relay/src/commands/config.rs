//! Config command - configuration inspection.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use oauth_relay_config::RelayConfig;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Path to config file (overrides default discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration (secrets redacted)
    Show,

    /// Show which config files are checked and which were loaded
    Which,

    /// Show the user configuration file path
    Path,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, _ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let loaded = super::load_config(args.config.as_deref())?;
            let effective = RelayConfig {
                server: Some(loaded.config.server()),
                provider: Some(loaded.config.provider()),
            };
            print!("{}", effective.redacted().to_toml()?);
        }
        ConfigCommand::Which => {
            let loaded = super::load_config(args.config.as_deref())?;
            for source in &loaded.sources {
                let status = if source.loaded { "loaded" } else { "not found" };
                println!("{} ({})", source.path.display(), status);
            }
        }
        ConfigCommand::Path => match oauth_relay_config::user_config_path() {
            Some(path) => println!("{}", path.display()),
            None => anyhow::bail!("Could not determine the user config directory"),
        },
    }
    Ok(())
}
