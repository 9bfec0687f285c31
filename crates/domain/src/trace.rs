use serde::Serialize;

/// Structured trace events emitted across all bridge crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    BackendCall {
        operation: String,
        endpoint: String,
        /// `success`, `application_error`, `malformed_reply` or `transport_error`.
        outcome: String,
        duration_ms: u64,
    },
    HealthProbe {
        endpoint: String,
        ok: bool,
        duration_ms: u64,
    },
    ToolInvoked {
        tool: String,
        is_error: bool,
        duration_ms: u64,
    },
    ResourceRead {
        uri: String,
        ok: bool,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "ob_event");
    }
}
