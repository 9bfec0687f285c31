//! The `serve` command: build the backend client, run the selected MCP
//! transport, release the connection pool on the way out.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;

use ob_backend::BackendClient;
use ob_domain::config::{Config, McpTransportKind};
use ob_mcp::McpServer;

pub async fn run(config: &Config) -> anyhow::Result<()> {
    let client = Arc::new(
        BackendClient::from_config(&config.backend).context("building backend client")?,
    );

    tracing::info!(
        backend = %client.profile().base_url,
        auth_mode = client.auth_mode().as_str(),
        max_records = client.max_records(),
        transport = %config.server.transport,
        "Odoo MCP bridge starting"
    );

    let server = McpServer::new(client.clone());
    let result = match config.server.transport {
        McpTransportKind::Stdio => serve_stdio(&server).await,
        McpTransportKind::StreamableHttp => serve_http(config, server).await,
    };

    // Released on every exit path, including transport failures.
    client.shutdown().await;
    tracing::info!("shutdown complete");

    result
}

async fn serve_stdio(server: &McpServer) -> anyhow::Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();

    tokio::select! {
        res = server.serve_stdio(reader, writer) => res.context("stdio transport error"),
        _ = shutdown_signal() => Ok(()),
    }
}

async fn serve_http(config: &Config, server: McpServer) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    ob_mcp::http::serve(listener, server, shutdown_signal())
        .await
        .context("axum server error")
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
                    _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, waiting for SIGINT only");
                let _ = ctrl_c.await;
                tracing::info!("received SIGINT, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        tracing::info!("received SIGINT, shutting down");
    }
}
