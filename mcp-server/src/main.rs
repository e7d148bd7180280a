use std::sync::Arc;

use clap::Parser;
use octopus_mcp_core::config::{API_KEY_ENV, SERVER_URL_ENV};
use octopus_mcp_core::{OctopusClient, OctopusConfig, OctopusError, UrlResolver};
use octopus_mcp_server::OctopusMcpServer;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "octopus-mcp-server", version, about = "Octopus Deploy MCP server")]
struct Cli {
    /// Octopus server URL (overrides OCTOPUS_SERVER_URL).
    #[arg(short = 's', long = "server-url")]
    server_url: Option<String>,

    /// Octopus API key (overrides OCTOPUS_API_KEY).
    #[arg(short = 'k', long = "api-key")]
    api_key: Option<String>,

    /// Log filter, e.g. "info" or "octopus_mcp_core=debug".
    #[arg(long = "log-level", default_value = "info")]
    log_level: String,
}

fn load_config(cli: &Cli) -> Result<OctopusConfig, OctopusError> {
    let server_url = cli
        .server_url
        .clone()
        .or_else(|| std::env::var(SERVER_URL_ENV).ok())
        .filter(|value| !value.is_empty());
    let api_key = cli
        .api_key
        .clone()
        .or_else(|| std::env::var(API_KEY_ENV).ok())
        .filter(|value| !value.is_empty());
    match (server_url, api_key) {
        (Some(server_url), Some(api_key)) => OctopusConfig::new(&server_url, api_key),
        _ => Err(OctopusError::Config(format!(
            "Environment variables {SERVER_URL_ENV} and {API_KEY_ENV} must be set \
             (or pass --server-url and --api-key)."
        ))),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the MCP transport; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = load_config(&cli)?;
    let client = Arc::new(OctopusClient::new(&config)?);
    let resolver = Arc::new(UrlResolver::for_client(client, &config));

    tracing::info!(instance = %config.instance_url(), "starting Octopus Deploy MCP server on stdio");
    OctopusMcpServer::new(resolver).serve_stdio().await?;
    Ok(())
}
