//! Start command - launches the relay server.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;

use oauth_relay_config::{load_dotenv, resolve_credentials};
use oauth_relay_exchange::Relay;
use oauth_relay_server::{Server, ServerConfig};

use super::Context;

/// Arguments for the start command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Identity provider token endpoint (overrides config)
    #[arg(long, env = "OAUTH_RELAY_TOKEN_URL")]
    pub token_url: Option<String>,

    /// Token endpoint timeout in seconds (overrides config)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Disable per-request logging
    #[arg(long)]
    pub no_request_logging: bool,

    /// Path to config file (overrides default discovery)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    // ── Load configuration ──────────────────────────────────────────────

    let dotenv_path = load_dotenv();
    let loaded = super::load_config(args.config.as_deref())?;

    if ctx.verbose {
        if let Some(path) = &dotenv_path {
            println!("Loaded environment: {}", path.display());
        }
        let sources = loaded.loaded_from();
        if sources.is_empty() {
            println!("No config files found, using defaults + CLI args");
        } else {
            for source in sources {
                println!("Loaded config: {}", source.display());
            }
        }
    }

    let mut server_section = loaded.config.server();
    if let Some(port) = args.port {
        server_section.port = port;
    }
    if let Some(bind) = args.bind {
        server_section.bind = bind;
    }
    if args.no_request_logging {
        server_section.request_logging = false;
    }

    let mut provider_section = loaded.config.provider();
    if let Some(token_url) = args.token_url {
        provider_section.token_url = token_url;
    }
    if let Some(timeout) = args.timeout {
        provider_section.timeout_secs = timeout;
    }

    // ── Resolve credentials ─────────────────────────────────────────────

    let resolved = resolve_credentials(&provider_section)
        .context("OAuth client credentials are required before the relay can start")?;

    if ctx.verbose {
        println!("Client id from: {}", resolved.client_id_source);
        println!("Client secret from: {}", resolved.client_secret_source);
    }

    // ── Build and run ───────────────────────────────────────────────────

    let provider_config = provider_section.provider_config(resolved.credentials)?;
    tracing::info!(
        token_url = %provider_config.token_url,
        timeout_secs = provider_config.timeout.as_secs(),
        "Token endpoint configured"
    );
    let relay = Relay::from_config(provider_config)?;

    let server_config = ServerConfig::new()
        .with_bind_address(server_section.socket_addr()?)
        .with_request_logging(server_section.request_logging)
        .with_max_body_size(server_section.max_body_size);

    // The bound address is logged once the listener is up
    let server = Server::new(relay, server_config);
    server.run_with_shutdown(shutdown_signal()).await?;
    Ok(())
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
