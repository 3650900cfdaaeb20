//! Process entry point: reads configuration from the environment, picks the
//! transport mode (STDIO, HTTP, or both), and blocks on the serving loop.
//!
//! Environment variables:
//! - `SERVER_NAME`: server identity (default: "toolbox-mcp-server")
//! - `SERVER_VERSION`: version string (default: crate version)
//! - `MCP_TRANSPORT_MODE`: "stdio", "http", or "both" (default: "both")
//! - `HOST`: bind address for HTTP mode (default: "0.0.0.0")
//! - `PORT`: port number for HTTP mode (default: 3000)
//! - `WORKER_THREADS`: HTTP worker count override

mod core;
mod resources;
mod tools;

use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::core::server;
use crate::core::utils::{ServerConfig, TransportMode};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Logs go to stderr: stdout belongs to the STDIO transport.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    };

    match config.transport {
        TransportMode::Stdio => server::run_server_stdio(config.name, config.version).await,
        TransportMode::Http => {
            server::run_server_http(config.name, config.version, config.host, config.port).await
        }
        TransportMode::Both => {
            let name = config.name.clone();
            let version = config.version.clone();

            // STDIO runs in the background so MCP Inspector can attach while
            // the HTTP endpoints stay reachable.
            let stdio_handle = tokio::spawn(async move {
                if let Err(err) = server::run_server_stdio(name, version).await {
                    error!("STDIO transport error: {err}");
                }
            });

            let http_result =
                server::run_server_http(config.name, config.version, config.host, config.port)
                    .await;

            stdio_handle.abort();
            http_result
        }
    }
}
