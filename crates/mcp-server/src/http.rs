//! `streamable-http` transport: one JSON-RPC message per `POST /mcp`.

use std::future::Future;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tower_http::trace::TraceLayer;

use crate::protocol::{JsonRpcError, JsonRpcResponse};
use crate::server::McpServer;

/// Build the HTTP router.
pub fn router(server: McpServer) -> Router {
    Router::new()
        .route("/mcp", post(handle_rpc))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve(
    listener: tokio::net::TcpListener,
    server: McpServer,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "MCP HTTP transport listening");
    }
    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn handle_rpc(State(server): State<McpServer>, body: Bytes) -> Response {
    let msg: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            let resp = JsonRpcResponse::failure(
                Value::Null,
                JsonRpcError::parse_error(format!("Parse error: {e}")),
            );
            return (StatusCode::BAD_REQUEST, Json(resp)).into_response();
        }
    };

    match server.handle_message(msg).await {
        Some(resp) => Json(resp).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn health() -> &'static str {
    "ok"
}
