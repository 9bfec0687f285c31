//! `BackendClient` - the operation facade.
//!
//! Each operation composes the same three steps: build the envelope
//! (auth injected), send it over the shared [`Transport`], classify the
//! reply.  The operation-specific part is only the argument shape and the
//! projection of the success payload:
//!
//! | Method        | Endpoint  | Projected key | Default |
//! |---------------|-----------|---------------|---------|
//! | `server_info` | `info`    | -             | -       |
//! | `list_models` | `models`  | `models`      | `[]`    |
//! | `get_fields`  | `fields`  | `fields`      | `[]`    |
//! | `search`      | `search`  | `records`     | `[]`    |
//! | `read`        | `read`    | `record`      | `{}`    |
//! | `count`       | `count`   | `count`       | `0`     |
//! | `create`      | `create`  | `id`          | `None`  |
//! | `write`       | `write`   | -             | `true`  |
//! | `unlink`      | `unlink`  | -             | `true`  |
//! | `execute`     | `execute` | `result`      | `null`  |

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use ob_domain::config::BackendConfig;
use ob_domain::error::{Error, Result};
use ob_domain::trace::TraceEvent;

use crate::auth::{auth_fields, auth_mode, AuthMode};
use crate::envelope::{Operation, RequestBuilder};
use crate::profile::ConnectionProfile;
use crate::reply::{interpret, OperationResult};
use crate::store::RecordStore;
use crate::transport::{HttpTransport, Transport};
use crate::types::{Domain, ExecuteRequest, FieldInfo, ModelInfo, Record, SearchRequest};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The operation facade over the Odoo MCP Bridge endpoints.
///
/// Created once and shared (`Arc`) for the lifetime of the process.  The
/// transport is owned explicitly and must be released with
/// [`shutdown`](Self::shutdown) on every exit path.
pub struct BackendClient {
    profile: ConnectionProfile,
    auth: Map<String, Value>,
    transport: Arc<dyn Transport>,
    builder: RequestBuilder,
    max_records: u32,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("profile", &self.profile)
            .field("auth_mode", &self.auth_mode())
            .field("max_records", &self.max_records)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Build a facade over an existing transport.
    pub fn new(profile: ConnectionProfile, transport: Arc<dyn Transport>, max_records: u32) -> Self {
        let auth = auth_fields(&profile);
        Self {
            profile,
            auth,
            transport,
            builder: RequestBuilder::new(),
            max_records: max_records.max(1),
        }
    }

    /// Build the profile and the shared HTTP transport from `[backend]`.
    pub fn from_config(cfg: &BackendConfig) -> Result<Self> {
        let profile = ConnectionProfile::from(cfg);
        let transport = HttpTransport::new(profile.timeout)?;
        Ok(Self::new(profile, Arc::new(transport), cfg.max_records))
    }

    pub fn profile(&self) -> &ConnectionProfile {
        &self.profile
    }

    pub fn auth_mode(&self) -> AuthMode {
        auth_mode(&self.profile)
    }

    pub fn max_records(&self) -> u32 {
        self.max_records
    }

    /// Clamp a caller-supplied limit to `max_records`.  Odoo reads `0` as
    /// "no limit", so it is clamped too.
    pub fn clamp_limit(&self, limit: u32) -> u32 {
        match limit {
            0 => self.max_records,
            n => n.min(self.max_records),
        }
    }

    /// Release the transport's connection pool.
    pub async fn shutdown(&self) {
        self.transport.shutdown().await;
        tracing::info!("backend client shut down");
    }

    // ── exchange ─────────────────────────────────────────────────────

    /// Perform one exchange and classify the reply.  Never fails; the
    /// outcome is carried by the returned [`OperationResult`].
    pub async fn call(&self, operation: Operation, args: Value) -> OperationResult {
        let url = self.profile.endpoint_url(operation.endpoint());
        let envelope = self.builder.build(operation, args, &self.auth);

        let start = Instant::now();
        tracing::debug!(%operation, id = envelope.id, "sending backend request");
        let result = match self.transport.send(&url, &envelope, self.profile.timeout).await {
            Ok(raw) => interpret(&raw),
            Err(e) => OperationResult::from(e),
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        TraceEvent::BackendCall {
            operation: operation.name().to_owned(),
            endpoint: format!("/mcp/{}", operation.endpoint()),
            outcome: result.outcome().to_owned(),
            duration_ms,
        }
        .emit();

        match &result {
            OperationResult::Success(_) => {}
            OperationResult::TransportError(e) => {
                tracing::warn!(%operation, kind = e.kind(), error = %e, "backend call failed");
            }
            OperationResult::ApplicationError(msg) | OperationResult::MalformedReply(msg) => {
                tracing::warn!(%operation, outcome = result.outcome(), error = %msg, "backend rejected call");
            }
        }

        result
    }

    /// [`call`](Self::call), converted to a tagged `Result`.
    async fn request(&self, operation: Operation, args: Value) -> Result<Value> {
        self.call(operation, args)
            .await
            .into_result()
            .map_err(|e| e.tagged(operation.name()))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Projection helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `payload[key]`, treating `null` as absent.
fn project<'a>(payload: &'a Value, key: &str) -> Option<&'a Value> {
    payload.get(key).filter(|v| !v.is_null())
}

/// Deserialize each element of `payload[key]`.  Only entries that are not
/// objects or lack their identifying key are skipped.
fn project_list<T: DeserializeOwned>(payload: &Value, key: &str, operation: Operation) -> Vec<T> {
    let Some(items) = project(payload, key).and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(%operation, error = %e, "skipping unparseable entry");
                None
            }
        })
        .collect()
}

fn with_optional(mut args: Value, key: &str, value: Option<impl serde::Serialize>) -> Result<Value> {
    if let (Some(v), Some(map)) = (value, args.as_object_mut()) {
        map.insert(key.to_owned(), serde_json::to_value(v)?);
    }
    Ok(args)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl RecordStore for BackendClient {
    async fn server_info(&self) -> Result<Value> {
        self.request(Operation::Info, json!({})).await
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let payload = self.request(Operation::ListModels, json!({})).await?;
        Ok(project_list(&payload, "models", Operation::ListModels))
    }

    async fn get_fields(&self, model: &str) -> Result<Vec<FieldInfo>> {
        let payload = self
            .request(Operation::GetFields, json!({ "model": model }))
            .await?;
        Ok(project_list(&payload, "fields", Operation::GetFields))
    }

    async fn search(&self, mut req: SearchRequest) -> Result<Vec<Record>> {
        let requested = req.limit;
        req.limit = self.clamp_limit(requested);
        if req.limit != requested {
            tracing::debug!(model = %req.model, requested, clamped = req.limit, "search limit clamped");
        }

        let args = serde_json::to_value(&req).map_err(|e| Error::from(e).tagged("search"))?;
        let payload = self.request(Operation::Search, args).await?;
        let Some(rows) = project(&payload, "records").and_then(Value::as_array) else {
            return Ok(Vec::new());
        };
        Ok(rows
            .iter()
            .filter_map(|row| match row.as_object() {
                Some(record) => Some(record.clone()),
                None => {
                    tracing::warn!(operation = %Operation::Search, row = %row, "skipping non-object search row");
                    None
                }
            })
            .collect())
    }

    async fn read(&self, model: &str, record_id: i64, fields: Option<Vec<String>>) -> Result<Record> {
        let args = with_optional(json!({ "model": model, "record_id": record_id }), "fields", fields)
            .map_err(|e| e.tagged("read"))?;
        let payload = self.request(Operation::Read, args).await?;
        Ok(project(&payload, "record")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default())
    }

    async fn count(&self, model: &str, domain: Domain) -> Result<u64> {
        let payload = self
            .request(Operation::Count, json!({ "model": model, "domain": domain }))
            .await?;
        Ok(project(&payload, "count").and_then(Value::as_u64).unwrap_or(0))
    }

    async fn create(&self, model: &str, values: Record) -> Result<Option<i64>> {
        let payload = self
            .request(Operation::Create, json!({ "model": model, "values": values }))
            .await?;
        Ok(project(&payload, "id").and_then(Value::as_i64))
    }

    async fn write(&self, model: &str, record_id: i64, values: Record) -> Result<bool> {
        self.request(
            Operation::Write,
            json!({ "model": model, "record_id": record_id, "values": values }),
        )
        .await?;
        Ok(true)
    }

    async fn unlink(&self, model: &str, record_id: i64) -> Result<bool> {
        self.request(Operation::Unlink, json!({ "model": model, "record_id": record_id }))
            .await?;
        Ok(true)
    }

    async fn execute(&self, req: ExecuteRequest) -> Result<Value> {
        let args = serde_json::to_value(&req).map_err(|e| Error::from(e).tagged("execute"))?;
        let payload = self.request(Operation::Execute, args).await?;
        Ok(project(&payload, "result").cloned().unwrap_or(Value::Null))
    }

    async fn health(&self) -> Value {
        let url = self.profile.endpoint_url("health");
        let start = Instant::now();
        let result = self.transport.probe(&url, self.profile.timeout).await;

        TraceEvent::HealthProbe {
            endpoint: "/mcp/health".into(),
            ok: result.is_ok(),
            duration_ms: start.elapsed().as_millis() as u64,
        }
        .emit();

        result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "health probe failed");
            json!({ "status": "error", "message": e.to_string() })
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
