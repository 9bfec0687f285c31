//! End-to-end dispatch tests: JSON-RPC in, JSON-RPC out, against an
//! in-memory `RecordStore`.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use ob_backend::{Domain, ExecuteRequest, FieldInfo, ModelInfo, Record, RecordStore, SearchRequest};
use ob_domain::error::{Error, Result};
use ob_mcp::{JsonRpcError, McpServer, TOOL_NAMES};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Fake store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Default)]
struct FakeStore {
    fail_with: Option<&'static str>,
    searches: Mutex<Vec<SearchRequest>>,
    executes: Mutex<Vec<ExecuteRequest>>,
}

impl FakeStore {
    fn failing(msg: &'static str) -> Self {
        Self {
            fail_with: Some(msg),
            ..Default::default()
        }
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        match self.fail_with {
            Some(msg) => Err(Error::Application(msg.into()).tagged(operation)),
            None => Ok(()),
        }
    }
}

fn partner(id: i64, name: &str) -> Record {
    json!({ "id": id, "name": name, "email": format!("{}@example.com", name.to_lowercase()) })
        .as_object()
        .cloned()
        .unwrap()
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn server_info(&self) -> Result<Value> {
        self.check("info")?;
        Ok(json!({ "version": "17.0" }))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        self.check("list_models")?;
        Ok(vec![ModelInfo {
            model: "res.partner".into(),
            name: Some("Contact".into()),
            can_read: true,
            ..Default::default()
        }])
    }

    async fn get_fields(&self, _model: &str) -> Result<Vec<FieldInfo>> {
        self.check("get_fields")?;
        let country: FieldInfo = serde_json::from_value(json!({
            "name": "country_id",
            "type": "many2one",
            "label": "Country",
            "relation": "res.country",
            "help": "Country of the address",
        }))?;
        Ok(vec![
            FieldInfo {
                name: "name".into(),
                field_type: Some("char".into()),
                label: Some("Name".into()),
                required: true,
                readonly: false,
                extra: Default::default(),
            },
            country,
        ])
    }

    async fn search(&self, req: SearchRequest) -> Result<Vec<Record>> {
        self.check("search")?;
        let empty = req.model == "x.empty";
        self.searches.lock().push(req);
        if empty {
            return Ok(vec![]);
        }
        Ok(vec![partner(1, "Acme"), partner(2, "Globex")])
    }

    async fn read(&self, _model: &str, record_id: i64, fields: Option<Vec<String>>) -> Result<Record> {
        self.check("read")?;
        if record_id == 404 {
            return Ok(Record::new());
        }
        if fields == Some(vec!["display_name".to_string()]) {
            return Ok(json!({ "id": record_id, "display_name": "Acme Corp" })
                .as_object()
                .cloned()
                .unwrap());
        }
        Ok(partner(record_id, "Acme"))
    }

    async fn count(&self, _model: &str, domain: Domain) -> Result<u64> {
        self.check("count")?;
        Ok(if domain.is_empty() { 42 } else { 3 })
    }

    async fn create(&self, _model: &str, _values: Record) -> Result<Option<i64>> {
        self.check("create")?;
        Ok(Some(99))
    }

    async fn write(&self, _model: &str, _record_id: i64, _values: Record) -> Result<bool> {
        self.check("write")?;
        Ok(true)
    }

    async fn unlink(&self, _model: &str, _record_id: i64) -> Result<bool> {
        self.check("unlink")?;
        Ok(true)
    }

    async fn execute(&self, req: ExecuteRequest) -> Result<Value> {
        self.check("execute")?;
        self.executes.lock().push(req);
        Ok(Value::Null)
    }

    async fn health(&self) -> Value {
        json!({ "status": "ok" })
    }
}

fn server_with(store: FakeStore) -> (McpServer, Arc<FakeStore>) {
    let store = Arc::new(store);
    (McpServer::new(store.clone()), store)
}

async fn rpc(server: &McpServer, method: &str, params: Value) -> Value {
    let msg = json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params });
    let resp = server.handle_message(msg).await.expect("request must be answered");
    serde_json::to_value(resp).unwrap()
}

async fn call_tool(server: &McpServer, name: &str, args: Value) -> (String, bool) {
    let v = rpc(server, "tools/call", json!({ "name": name, "arguments": args })).await;
    let result = &v["result"];
    (
        result["content"][0]["text"].as_str().unwrap_or_default().to_owned(),
        result["isError"].as_bool().unwrap_or(false),
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Protocol
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn initialize_announces_server() {
    let (server, _) = server_with(FakeStore::default());
    let v = rpc(&server, "initialize", json!({ "protocolVersion": "2024-11-05" })).await;
    assert_eq!(v["id"], 1);
    assert_eq!(v["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(v["result"]["serverInfo"]["name"], "AD MCP Bridge Server");
}

#[tokio::test]
async fn tools_list_has_every_tool() {
    let (server, _) = server_with(FakeStore::default());
    let v = rpc(&server, "tools/list", Value::Null).await;
    let tools = v["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 11);
    assert_eq!(tools.len(), TOOL_NAMES.len());
    assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
}

#[tokio::test]
async fn unknown_method_is_method_not_found() {
    let (server, _) = server_with(FakeStore::default());
    let v = rpc(&server, "prompts/get", json!({})).await;
    assert_eq!(v["error"]["code"], JsonRpcError::METHOD_NOT_FOUND);
}

#[tokio::test]
async fn notifications_get_no_reply() {
    let (server, _) = server_with(FakeStore::default());
    let msg = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" });
    assert!(server.handle_message(msg).await.is_none());
}

#[tokio::test]
async fn wrong_version_is_invalid_request() {
    let (server, _) = server_with(FakeStore::default());
    let msg = json!({ "jsonrpc": "1.0", "id": 5, "method": "ping" });
    let resp = server.handle_message(msg).await.unwrap();
    assert_eq!(resp.id, json!(5));
    assert_eq!(resp.error.unwrap().code, JsonRpcError::INVALID_REQUEST);
}

#[tokio::test]
async fn garbage_line_is_parse_error() {
    let (server, _) = server_with(FakeStore::default());
    let out = server.handle_line("{not json").await.unwrap();
    let v: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(v["error"]["code"], JsonRpcError::PARSE_ERROR);
    assert_eq!(v["id"], Value::Null);
}

#[tokio::test]
async fn unknown_tool_is_invalid_params() {
    let (server, _) = server_with(FakeStore::default());
    let v = rpc(&server, "tools/call", json!({ "name": "drop_database" })).await;
    assert_eq!(v["error"]["code"], JsonRpcError::INVALID_PARAMS);
    assert!(v["error"]["message"].as_str().unwrap().contains("drop_database"));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tools
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn search_records_formats_list_and_applies_defaults() {
    let (server, store) = server_with(FakeStore::default());
    let (text, is_error) = call_tool(&server, "search_records", json!({ "model": "res.partner" })).await;
    assert!(!is_error);
    assert!(text.starts_with("# Found 2 records in res.partner"));
    assert!(text.contains("## Acme (ID: 1)"));

    let req = store.searches.lock()[0].clone();
    assert_eq!(req.limit, 80);
    assert_eq!(req.offset, 0);
    assert!(req.domain.is_empty());
}

#[tokio::test]
async fn search_with_no_hits_says_so() {
    let (server, _) = server_with(FakeStore::default());
    let (text, _) = call_tool(&server, "search_records", json!({ "model": "x.empty" })).await;
    assert_eq!(text, "No records found in x.empty matching the criteria.");
}

#[tokio::test]
async fn get_record_formats_single_and_handles_missing() {
    let (server, _) = server_with(FakeStore::default());
    let (text, _) = call_tool(&server, "get_record", json!({ "model": "res.partner", "record_id": 7 })).await;
    assert!(text.starts_with("# res.partner: Acme (ID: 7)"));
    assert!(text.contains("## Basic Information"));

    let (text, _) = call_tool(&server, "get_record", json!({ "model": "res.partner", "record_id": 404 })).await;
    assert_eq!(text, "Record 404 not found in res.partner.");
}

#[tokio::test]
async fn count_records_mentions_domain() {
    let (server, _) = server_with(FakeStore::default());
    let (text, _) = call_tool(&server, "count_records", json!({ "model": "res.partner" })).await;
    assert_eq!(text, "Found 42 records in res.partner.");

    let (text, _) = call_tool(
        &server,
        "count_records",
        json!({ "model": "res.partner", "domain": [["is_company", "=", true]] }),
    )
    .await;
    assert!(text.starts_with("Found 3 records in res.partner matching"));
}

#[tokio::test]
async fn mutation_tools_report_success() {
    let (server, _) = server_with(FakeStore::default());
    let (text, _) = call_tool(&server, "create_record", json!({ "model": "res.partner", "values": { "name": "New" } })).await;
    assert_eq!(text, "Successfully created res.partner record with ID 99.");

    let (text, _) = call_tool(
        &server,
        "update_record",
        json!({ "model": "res.partner", "record_id": 5, "values": { "email": "x@y" } }),
    )
    .await;
    assert_eq!(text, "Successfully updated res.partner record 5. Fields: email");

    let (text, _) = call_tool(&server, "delete_record", json!({ "model": "res.partner", "record_id": 5 })).await;
    assert_eq!(text, "Successfully deleted res.partner record 5.");
}

#[tokio::test]
async fn execute_method_passes_kwargs() {
    let (server, store) = server_with(FakeStore::default());
    let (text, _) = call_tool(
        &server,
        "execute_method",
        json!({ "model": "sale.order", "method": "action_confirm", "record_ids": [5], "kwargs": { "force": true } }),
    )
    .await;
    assert_eq!(text, "Method action_confirm executed successfully on sale.order.");
    let req = store.executes.lock()[0].clone();
    assert_eq!(req.record_ids, Some(vec![5]));
    assert_eq!(req.kwargs.unwrap()["force"], true);
}

#[tokio::test]
async fn record_name_and_find_one() {
    let (server, store) = server_with(FakeStore::default());
    let (text, _) = call_tool(&server, "get_record_name", json!({ "model": "res.partner", "record_id": 3 })).await;
    assert_eq!(text, "Acme Corp");

    let (text, _) = call_tool(
        &server,
        "search_and_read_one",
        json!({ "model": "res.partner", "domain": [["name", "=", "Acme"]] }),
    )
    .await;
    assert!(text.starts_with("# res.partner: Acme (ID: 1)"));
    assert_eq!(store.searches.lock()[0].limit, 1);
}

#[tokio::test]
async fn model_introspection_tools() {
    let (server, _) = server_with(FakeStore::default());
    let (text, _) = call_tool(&server, "list_models", json!({})).await;
    assert!(text.contains("- res.partner (Contact): read"));

    let (text, _) = call_tool(&server, "get_model_fields", json!({ "model": "res.partner" })).await;
    assert!(text.contains("## Char Fields"));
    assert!(text.contains("- name: Name (required)"));
}

#[tokio::test]
async fn backend_failures_are_tool_errors() {
    let (server, _) = server_with(FakeStore::failing("Model not enabled"));
    let (text, is_error) = call_tool(&server, "search_records", json!({ "model": "x.secret" })).await;
    assert!(is_error);
    assert_eq!(text, "Error searching x.secret: Odoo error: Model not enabled");

    let (text, is_error) = call_tool(&server, "delete_record", json!({ "model": "res.partner", "record_id": 9 })).await;
    assert!(is_error);
    assert_eq!(text, "Error deleting res.partner record 9: Odoo error: Model not enabled");
}

#[tokio::test]
async fn bad_arguments_are_tool_errors() {
    let (server, _) = server_with(FakeStore::default());
    let (text, is_error) = call_tool(&server, "get_record", json!({ "model": "res.partner", "record_id": "seven" })).await;
    assert!(is_error);
    assert!(text.starts_with("invalid arguments for get_record:"));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Resources
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn resources_read_count_and_record() {
    let (server, _) = server_with(FakeStore::default());

    let v = rpc(&server, "resources/read", json!({ "uri": "odoo://res.partner/count" })).await;
    let text = v["result"]["contents"][0]["text"].as_str().unwrap();
    let body: Value = serde_json::from_str(text).unwrap();
    assert_eq!(body, json!({ "model": "res.partner", "count": 42 }));

    let v = rpc(&server, "resources/read", json!({ "uri": "odoo://res.partner/record/4" })).await;
    let content = &v["result"]["contents"][0];
    assert_eq!(content["mimeType"], "text/markdown");
    assert!(content["text"].as_str().unwrap().starts_with("# res.partner: Acme (ID: 4)"));
}

#[tokio::test]
async fn resources_read_models_is_json() {
    let (server, _) = server_with(FakeStore::default());
    let v = rpc(&server, "resources/read", json!({ "uri": "odoo://models" })).await;
    let text = v["result"]["contents"][0]["text"].as_str().unwrap();
    let models: Value = serde_json::from_str(text).unwrap();
    assert_eq!(models[0]["model"], "res.partner");
}

#[tokio::test]
async fn resources_read_fields_keeps_backend_keys() {
    let (server, _) = server_with(FakeStore::default());
    let v = rpc(&server, "resources/read", json!({ "uri": "odoo://model/res.partner/fields" })).await;
    let content = &v["result"]["contents"][0];
    assert_eq!(content["mimeType"], "application/json");
    let fields: Value = serde_json::from_str(content["text"].as_str().unwrap()).unwrap();
    assert_eq!(fields[1]["name"], "country_id");
    assert_eq!(fields[1]["relation"], "res.country");
    assert_eq!(fields[1]["help"], "Country of the address");
}

#[tokio::test]
async fn resource_errors_map_to_jsonrpc_codes() {
    let (server, _) = server_with(FakeStore::default());
    let v = rpc(&server, "resources/read", json!({ "uri": "odoo://nope/at/all/here" })).await;
    assert_eq!(v["error"]["code"], JsonRpcError::INVALID_PARAMS);

    let (server, _) = server_with(FakeStore::failing("denied"));
    let v = rpc(&server, "resources/read", json!({ "uri": "odoo://models" })).await;
    assert_eq!(v["error"]["code"], JsonRpcError::INTERNAL_ERROR);
    assert_eq!(v["error"]["message"], "Odoo error: denied");
}

#[tokio::test]
async fn resource_listings() {
    let (server, _) = server_with(FakeStore::default());
    let v = rpc(&server, "resources/list", Value::Null).await;
    assert_eq!(v["result"]["resources"][0]["uri"], "odoo://models");
    let v = rpc(&server, "resources/templates/list", Value::Null).await;
    assert_eq!(v["result"]["resourceTemplates"].as_array().unwrap().len(), 3);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Transports
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn stdio_loop_answers_requests_in_order() {
    let (server, _) = server_with(FakeStore::default());
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#, "\n",
        "\n",
        "some log noise\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#, "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#, "\n",
    );
    let mut out = Vec::new();
    server.serve_stdio(input.as_bytes(), &mut out).await.unwrap();

    let lines: Vec<Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["id"], 1);
    assert_eq!(lines[0]["result"], json!({}));
    assert_eq!(lines[1]["id"], 2);
}

#[tokio::test]
async fn http_transport_serves_rpc_and_health() {
    let (server, _) = server_with(FakeStore::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(ob_mcp::http::serve(listener, server, async move {
        let _ = rx.await;
    }));

    let http = reqwest::Client::new();
    let health = http.get(format!("http://{addr}/health")).send().await.unwrap();
    assert_eq!(health.text().await.unwrap(), "ok");

    let resp: Value = http
        .post(format!("http://{addr}/mcp"))
        .json(&json!({ "jsonrpc": "2.0", "id": "a", "method": "ping" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["id"], "a");

    let notif = http
        .post(format!("http://{addr}/mcp"))
        .json(&json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }))
        .send()
        .await
        .unwrap();
    assert_eq!(notif.status(), reqwest::StatusCode::ACCEPTED);

    let bad = http
        .post(format!("http://{addr}/mcp"))
        .body("{oops")
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), reqwest::StatusCode::BAD_REQUEST);

    let _ = tx.send(());
    handle.await.unwrap().unwrap();
}
