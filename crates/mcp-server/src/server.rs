//! JSON-RPC method dispatch and the stdio loop.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use ob_backend::RecordStore;

use crate::protocol::{
    initialize_result, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallParams,
};
use crate::resources::{read_resource, resource_list, resource_templates};
use crate::tools::{ToolCatalogue, ToolError};

/// The MCP server.  Cheap to clone; all clones share one store.
#[derive(Clone)]
pub struct McpServer {
    store: Arc<dyn RecordStore>,
    tools: ToolCatalogue,
}

impl McpServer {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            tools: ToolCatalogue::new(store.clone()),
            store,
        }
    }

    // ── message handling ─────────────────────────────────────────────

    /// Handle one raw line.  Returns the serialized response, if any.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(line) {
            Ok(msg) => self.handle_message(msg).await?,
            Err(e) => JsonRpcResponse::failure(
                Value::Null,
                JsonRpcError::parse_error(format!("Parse error: {e}")),
            ),
        };
        match serde_json::to_string(&response) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response");
                None
            }
        }
    }

    /// Handle one decoded message.  Notifications yield `None`.
    pub async fn handle_message(&self, msg: Value) -> Option<JsonRpcResponse> {
        let id = msg.get("id").cloned();
        let req: JsonRpcRequest = match serde_json::from_value(msg) {
            Ok(req) => req,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    id.unwrap_or(Value::Null),
                    JsonRpcError::invalid_request(format!("Invalid request: {e}")),
                ));
            }
        };

        if req.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::failure(
                req.id.unwrap_or(Value::Null),
                JsonRpcError::invalid_request("jsonrpc must be \"2.0\""),
            ));
        }

        let Some(id) = req.id else {
            tracing::debug!(method = %req.method, "notification received");
            return None;
        };

        tracing::debug!(method = %req.method, %id, "request received");
        let params = req.params.unwrap_or(Value::Null);
        Some(match self.handle_request(&req.method, params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => {
                tracing::debug!(method = %req.method, code = err.code, error = %err.message, "request failed");
                JsonRpcResponse::failure(id, err)
            }
        })
    }

    async fn handle_request(&self, method: &str, params: Value) -> Result<Value, JsonRpcError> {
        match method {
            "initialize" => to_value(initialize_result()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.tools.definitions() })),
            "tools/call" => self.tools_call(params).await,
            "resources/list" => Ok(json!({ "resources": resource_list() })),
            "resources/templates/list" => Ok(json!({ "resourceTemplates": resource_templates() })),
            "resources/read" => self.resources_read(params).await,
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }

    async fn tools_call(&self, params: Value) -> Result<Value, JsonRpcError> {
        let params: ToolCallParams = serde_json::from_value(params)
            .map_err(|e| JsonRpcError::invalid_params(format!("tools/call: {e}")))?;

        let args = params.arguments.unwrap_or(Value::Null);
        match self.tools.call(&params.name, args).await {
            Ok(result) => to_value(result),
            Err(e @ ToolError::UnknownTool(_)) => Err(JsonRpcError::invalid_params(e.to_string())),
            Err(e) => Err(JsonRpcError::internal(e.to_string())),
        }
    }

    async fn resources_read(&self, params: Value) -> Result<Value, JsonRpcError> {
        let uri = params
            .get("uri")
            .and_then(Value::as_str)
            .ok_or_else(|| JsonRpcError::invalid_params("resources/read requires string field 'uri'"))?;
        let content = read_resource(self.store.as_ref(), uri).await?;
        Ok(json!({ "contents": [content] }))
    }

    // ── stdio ────────────────────────────────────────────────────────

    /// Serve newline-delimited JSON-RPC until `reader` reaches EOF.
    ///
    /// Requests are handled in arrival order.  Blank lines and lines that
    /// do not start like a JSON message are skipped.
    pub async fn serve_stdio<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
                tracing::debug!(line = %trimmed, "skipping non-JSON line on stdin");
                continue;
            }
            if let Some(out) = self.handle_line(trimmed).await {
                writer.write_all(out.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        tracing::info!("stdin closed, stopping stdio server");
        Ok(())
    }
}

fn to_value(v: impl serde::Serialize) -> Result<Value, JsonRpcError> {
    serde_json::to_value(v).map_err(|e| JsonRpcError::internal(e.to_string()))
}
