//! JSON-RPC envelope construction for the bridge endpoints.
//!
//! Every operation is a POST to `{base_url}/mcp/{token}` with body
//! `{"jsonrpc": "2.0", "method": "call", "params": {...}, "id": N}`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire key for `execute`'s keyword arguments.  Some backends reserve
/// `kwargs` on the envelope itself, so the bridge module reads this one.
pub const EXECUTE_KWARGS_KEY: &str = "kwargs_data";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Operations
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The fixed vocabulary of backend operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Info,
    ListModels,
    GetFields,
    Search,
    Read,
    Count,
    Create,
    Write,
    Unlink,
    Execute,
}

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::Info,
        Operation::ListModels,
        Operation::GetFields,
        Operation::Search,
        Operation::Read,
        Operation::Count,
        Operation::Create,
        Operation::Write,
        Operation::Unlink,
        Operation::Execute,
    ];

    /// Endpoint token appended to `{base_url}/mcp/`.
    pub fn endpoint(self) -> &'static str {
        match self {
            Operation::Info => "info",
            Operation::ListModels => "models",
            Operation::GetFields => "fields",
            Operation::Search => "search",
            Operation::Read => "read",
            Operation::Count => "count",
            Operation::Create => "create",
            Operation::Write => "write",
            Operation::Unlink => "unlink",
            Operation::Execute => "execute",
        }
    }

    /// Name used in logs and error tags.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Info => "info",
            Operation::ListModels => "list_models",
            Operation::GetFields => "get_fields",
            Operation::Search => "search",
            Operation::Read => "read",
            Operation::Count => "count",
            Operation::Create => "create",
            Operation::Write => "write",
            Operation::Unlink => "unlink",
            Operation::Execute => "execute",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Envelope
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A JSON-RPC 2.0 `call` request as the bridge module expects it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub jsonrpc: String,
    pub method: String,
    pub params: Map<String, Value>,
    pub id: u64,
}

/// Assembles envelopes and hands out correlation ids.
///
/// Ids only need to be present, not globally unique; a process-local
/// counter keeps them distinct in logs.
#[derive(Debug)]
pub struct RequestBuilder {
    next_id: AtomicU64,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }

    fn next_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Build the envelope for `operation`.
    ///
    /// `args` should be a JSON object; anything else is wrapped as
    /// `{"args": value}`.  Auth fields are applied last so a caller can
    /// never overwrite `api_key`, `user` or `password`.
    pub fn build(
        &self,
        operation: Operation,
        args: Value,
        auth_fields: &Map<String, Value>,
    ) -> Envelope {
        let mut params = match args {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                tracing::debug!(%operation, "non-object args wrapped under \"args\"");
                let mut map = Map::new();
                map.insert("args".into(), other);
                map
            }
        };

        for (key, value) in auth_fields {
            params.insert(key.clone(), value.clone());
        }

        Envelope {
            jsonrpc: "2.0".into(),
            method: "call".into(),
            params,
            id: self.next_request_id(),
        }
    }
}
