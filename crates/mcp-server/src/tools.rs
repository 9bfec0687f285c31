//! The tool catalogue: MCP tool definitions and their dispatch onto the
//! [`RecordStore`].
//!
//! Every tool answers with text.  Backend failures never escape as
//! JSON-RPC errors; they become a short diagnostic with `isError: true`.
//! Only an unknown tool name is a protocol-level error.

use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use ob_backend::format::{
    describe_failure, format_count, format_created, format_deleted, format_execute, format_fields,
    format_models, format_record, format_records, format_updated,
};
use ob_backend::types::DEFAULT_SEARCH_LIMIT;
use ob_backend::{Domain, ExecuteRequest, Record, RecordStore, SearchRequest};
use ob_domain::error::Error;
use ob_domain::trace::TraceEvent;

use crate::protocol::{McpToolDef, ToolCallResult};

/// Errors raised while dispatching a tool call.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Rendered diagnostic for a failed backend call.
    #[error("{0}")]
    Failed(String),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Arguments
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
struct SearchArgs {
    model: String,
    #[serde(default)]
    domain: Option<Domain>,
    #[serde(default)]
    fields: Option<Vec<String>>,
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    offset: Option<u32>,
    #[serde(default)]
    order: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordArgs {
    model: String,
    record_id: i64,
    #[serde(default)]
    fields: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct CountArgs {
    model: String,
    #[serde(default)]
    domain: Option<Domain>,
}

#[derive(Debug, Deserialize)]
struct FieldsArgs {
    model: String,
    #[serde(default)]
    field_types: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct CreateArgs {
    model: String,
    values: Record,
}

#[derive(Debug, Deserialize)]
struct UpdateArgs {
    model: String,
    record_id: i64,
    values: Record,
}

#[derive(Debug, Deserialize)]
struct ExecuteArgs {
    model: String,
    method: String,
    #[serde(default)]
    record_ids: Option<Vec<i64>>,
    #[serde(default)]
    args: Option<Vec<Value>>,
    #[serde(default)]
    kwargs: Option<serde_json::Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct FindOneArgs {
    model: String,
    domain: Domain,
    #[serde(default)]
    fields: Option<Vec<String>>,
}

fn parse<T: DeserializeOwned>(tool: &'static str, args: Value) -> Result<T, ToolError> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(|source| ToolError::InvalidArguments { tool, source })
}

/// Wrap a backend failure into a [`ToolError::Failed`] diagnostic.
fn failed(action: &str, target: &str, err: Error) -> ToolError {
    tracing::warn!(
        operation = err.operation().unwrap_or("unknown"),
        target,
        error = %err.untagged(),
        "tool call failed"
    );
    ToolError::Failed(describe_failure(action, target, &err))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Catalogue
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Names of every tool, in listing order.
pub const TOOL_NAMES: &[&str] = &[
    "search_records",
    "get_record",
    "count_records",
    "list_models",
    "get_model_fields",
    "create_record",
    "update_record",
    "delete_record",
    "execute_method",
    "get_record_name",
    "search_and_read_one",
];

/// Dispatches MCP tool calls to a shared [`RecordStore`].
#[derive(Clone)]
pub struct ToolCatalogue {
    store: Arc<dyn RecordStore>,
}

impl ToolCatalogue {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Tool definitions for `tools/list`.
    pub fn definitions(&self) -> Vec<McpToolDef> {
        tool_definitions()
    }

    /// Run a tool.  Only an unknown tool name is returned as `Err`; every
    /// other failure is folded into an `isError` result.
    pub async fn call(&self, name: &str, args: Value) -> Result<ToolCallResult, ToolError> {
        let start = Instant::now();
        let outcome = self.dispatch(name, args).await;

        let result = match outcome {
            Ok(text) => ToolCallResult::text(text),
            Err(e @ ToolError::UnknownTool(_)) => return Err(e),
            Err(e) => ToolCallResult::error(e.to_string()),
        };

        TraceEvent::ToolInvoked {
            tool: name.to_owned(),
            is_error: result.is_error,
            duration_ms: start.elapsed().as_millis() as u64,
        }
        .emit();

        Ok(result)
    }

    async fn dispatch(&self, name: &str, args: Value) -> Result<String, ToolError> {
        match name {
            "search_records" => self.search_records(parse("search_records", args)?).await,
            "get_record" => self.get_record(parse("get_record", args)?).await,
            "count_records" => self.count_records(parse("count_records", args)?).await,
            "list_models" => self.list_models().await,
            "get_model_fields" => self.get_model_fields(parse("get_model_fields", args)?).await,
            "create_record" => self.create_record(parse("create_record", args)?).await,
            "update_record" => self.update_record(parse("update_record", args)?).await,
            "delete_record" => self.delete_record(parse("delete_record", args)?).await,
            "execute_method" => self.execute_method(parse("execute_method", args)?).await,
            "get_record_name" => self.get_record_name(parse("get_record_name", args)?).await,
            "search_and_read_one" => {
                self.search_and_read_one(parse("search_and_read_one", args)?).await
            }
            other => Err(ToolError::UnknownTool(other.to_owned())),
        }
    }

    // ── search and read ──────────────────────────────────────────────

    async fn search_records(&self, a: SearchArgs) -> Result<String, ToolError> {
        let req = SearchRequest {
            model: a.model.clone(),
            domain: a.domain.unwrap_or_default(),
            fields: a.fields,
            limit: a.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
            offset: a.offset.unwrap_or(0),
            order: a.order,
        };
        let records = self
            .store
            .search(req)
            .await
            .map_err(|e| failed("searching", &a.model, e))?;

        if records.is_empty() {
            return Ok(format!("No records found in {} matching the criteria.", a.model));
        }
        Ok(format_records(&a.model, &records))
    }

    async fn get_record(&self, a: RecordArgs) -> Result<String, ToolError> {
        let target = format!("{} record {}", a.model, a.record_id);
        let record = self
            .store
            .read(&a.model, a.record_id, a.fields)
            .await
            .map_err(|e| failed("reading", &target, e))?;

        if record.is_empty() {
            return Ok(format!("Record {} not found in {}.", a.record_id, a.model));
        }
        Ok(format_record(&a.model, &record))
    }

    async fn count_records(&self, a: CountArgs) -> Result<String, ToolError> {
        let domain = a.domain.unwrap_or_default();
        let count = self
            .store
            .count(&a.model, domain.clone())
            .await
            .map_err(|e| failed("counting", &a.model, e))?;
        Ok(format_count(&a.model, count, &domain))
    }

    async fn get_record_name(&self, a: RecordArgs) -> Result<String, ToolError> {
        let target = format!("{} record {}", a.model, a.record_id);
        let record = self
            .store
            .read(&a.model, a.record_id, Some(vec!["display_name".into()]))
            .await
            .map_err(|e| failed("reading name of", &target, e))?;

        Ok(record
            .get("display_name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("{},{}", a.model, a.record_id)))
    }

    async fn search_and_read_one(&self, a: FindOneArgs) -> Result<String, ToolError> {
        let domain_text = Value::Array(a.domain.clone()).to_string();
        let mut req = SearchRequest::new(a.model.clone()).domain(a.domain).limit(1);
        req.fields = a.fields;

        let records = self
            .store
            .search(req)
            .await
            .map_err(|e| failed("searching", &a.model, e))?;

        match records.first() {
            Some(record) => Ok(format_record(&a.model, record)),
            None => Ok(format!("No record found in {} matching {domain_text}.", a.model)),
        }
    }

    // ── model information ────────────────────────────────────────────

    async fn list_models(&self) -> Result<String, ToolError> {
        let models = self
            .store
            .list_models()
            .await
            .map_err(|e| failed("listing", "models", e))?;
        Ok(format_models(&models))
    }

    async fn get_model_fields(&self, a: FieldsArgs) -> Result<String, ToolError> {
        let fields = self
            .store
            .get_fields(&a.model)
            .await
            .map_err(|e| failed("getting fields for", &a.model, e))?;
        Ok(format_fields(&a.model, &fields, &a.field_types.unwrap_or_default()))
    }

    // ── mutations ────────────────────────────────────────────────────

    async fn create_record(&self, a: CreateArgs) -> Result<String, ToolError> {
        let id = self
            .store
            .create(&a.model, a.values)
            .await
            .map_err(|e| failed("creating", &a.model, e))?;
        Ok(format_created(&a.model, id))
    }

    async fn update_record(&self, a: UpdateArgs) -> Result<String, ToolError> {
        let target = format!("{} record {}", a.model, a.record_id);
        self.store
            .write(&a.model, a.record_id, a.values.clone())
            .await
            .map_err(|e| failed("updating", &target, e))?;
        Ok(format_updated(&a.model, a.record_id, &a.values))
    }

    async fn delete_record(&self, a: RecordArgs) -> Result<String, ToolError> {
        let target = format!("{} record {}", a.model, a.record_id);
        self.store
            .unlink(&a.model, a.record_id)
            .await
            .map_err(|e| failed("deleting", &target, e))?;
        Ok(format_deleted(&a.model, a.record_id))
    }

    async fn execute_method(&self, a: ExecuteArgs) -> Result<String, ToolError> {
        let action = format!("executing {} on", a.method);
        let req = ExecuteRequest {
            model: a.model.clone(),
            method: a.method.clone(),
            record_ids: a.record_ids,
            args: a.args,
            kwargs: a.kwargs,
        };
        let result = self
            .store
            .execute(req)
            .await
            .map_err(|e| failed(&action, &a.model, e))?;
        Ok(format_execute(&a.model, &a.method, &result))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Definitions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn tool(name: &str, description: &str, input_schema: Value) -> McpToolDef {
    McpToolDef {
        name: name.into(),
        description: description.into(),
        input_schema,
    }
}

fn tool_definitions() -> Vec<McpToolDef> {
    let model = json!({ "type": "string", "description": "Odoo model name, e.g. 'res.partner'" });
    let record_id = json!({ "type": "integer", "description": "Record ID" });
    let domain = json!({
        "type": "array",
        "description": "Odoo domain, e.g. [[\"is_company\", \"=\", true]]",
        "items": {}
    });
    let fields = json!({
        "type": "array",
        "description": "Field names to return",
        "items": { "type": "string" }
    });
    let values = json!({ "type": "object", "description": "Field values" });

    vec![
        tool(
            "search_records",
            "Search for records in an Odoo model. Common domain operators: =, !=, >, <, >=, <=, like, ilike, in, not in.",
            object_schema(
                json!({
                    "model": model,
                    "domain": domain,
                    "fields": fields,
                    "limit": { "type": "integer", "default": DEFAULT_SEARCH_LIMIT, "description": "Maximum records to return" },
                    "offset": { "type": "integer", "default": 0, "description": "Records to skip, for pagination" },
                    "order": { "type": "string", "description": "Sort order, e.g. 'name asc, id desc'" }
                }),
                &["model"],
            ),
        ),
        tool(
            "get_record",
            "Get a specific record by ID.",
            object_schema(
                json!({ "model": model, "record_id": record_id, "fields": fields }),
                &["model", "record_id"],
            ),
        ),
        tool(
            "count_records",
            "Count records matching a domain.",
            object_schema(json!({ "model": model, "domain": domain }), &["model"]),
        ),
        tool(
            "list_models",
            "List all Odoo models available for MCP access, with their permissions.",
            object_schema(json!({}), &[]),
        ),
        tool(
            "get_model_fields",
            "Get field definitions for a model, grouped by type.",
            object_schema(
                json!({
                    "model": model,
                    "field_types": {
                        "type": "array",
                        "description": "Only include these field types, e.g. ['char', 'many2one']",
                        "items": { "type": "string" }
                    }
                }),
                &["model"],
            ),
        ),
        tool(
            "create_record",
            "Create a new record.",
            object_schema(json!({ "model": model, "values": values }), &["model", "values"]),
        ),
        tool(
            "update_record",
            "Update an existing record.",
            object_schema(
                json!({ "model": model, "record_id": record_id, "values": values }),
                &["model", "record_id", "values"],
            ),
        ),
        tool(
            "delete_record",
            "Delete a record. This action is irreversible.",
            object_schema(json!({ "model": model, "record_id": record_id }), &["model", "record_id"]),
        ),
        tool(
            "execute_method",
            "Execute a custom method on an Odoo model. Requires special permission in Odoo settings.",
            object_schema(
                json!({
                    "model": model,
                    "method": { "type": "string", "description": "Method name, e.g. 'action_confirm'" },
                    "record_ids": { "type": "array", "items": { "type": "integer" } },
                    "args": { "type": "array", "description": "Positional arguments", "items": {} },
                    "kwargs": { "type": "object", "description": "Keyword arguments" }
                }),
                &["model", "method"],
            ),
        ),
        tool(
            "get_record_name",
            "Get the display name of a record.",
            object_schema(json!({ "model": model, "record_id": record_id }), &["model", "record_id"]),
        ),
        tool(
            "search_and_read_one",
            "Search and return the first matching record.",
            object_schema(
                json!({ "model": model, "domain": domain, "fields": fields }),
                &["model", "domain"],
            ),
        ),
    ]
}
