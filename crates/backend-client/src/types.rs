//! Request and introspection DTOs for the bridge endpoints.
//!
//! Optional fields are skipped on the wire so the backend applies its own
//! defaults.  Domains are opaque filter expressions passed through as-is.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Filter expression, e.g. `[["is_company", "=", true]]`.
pub type Domain = Vec<Value>;

/// A record as returned by the backend: field name → value.
pub type Record = Map<String, Value>;

pub const DEFAULT_SEARCH_LIMIT: u32 = 80;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// search
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// POST /mcp/search - params.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchRequest {
    pub model: String,
    #[serde(default)]
    pub domain: Domain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

fn default_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

impl SearchRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            domain: Vec::new(),
            fields: None,
            limit: DEFAULT_SEARCH_LIMIT,
            offset: 0,
            order: None,
        }
    }

    pub fn domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    pub fn fields(mut self, fields: Vec<String>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// execute
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// POST /mcp/execute - params.  `kwargs` travels as `kwargs_data`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecuteRequest {
    pub model: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_ids: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<Value>>,
    #[serde(
        default,
        rename = "kwargs_data",
        skip_serializing_if = "Option::is_none"
    )]
    pub kwargs: Option<Map<String, Value>>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Introspection payloads
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One entry of `data.models`.
///
/// Keys not modelled here are kept in `extra` so the entry serializes back
/// out unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ModelInfo {
    pub model: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub can_read: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub can_create: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub can_write: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub can_delete: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModelInfo {
    /// Human names of the granted permissions, in a fixed order.
    pub fn permissions(&self) -> Vec<&'static str> {
        [
            (self.can_read, "read"),
            (self.can_create, "create"),
            (self.can_write, "update"),
            (self.can_delete, "delete"),
        ]
        .into_iter()
        .filter_map(|(granted, name)| granted.then_some(name))
        .collect()
    }
}

/// One entry of `data.fields`.  Extra keys (`relation`, `help`,
/// `selection`, ...) are kept in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FieldInfo {
    pub name: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub field_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub required: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub readonly: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Odoo sends `false` for an empty char value; anything but a string is `None`.
fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Only a literal `true` grants; `null` and other shapes read as `false`.
fn lenient_bool<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(de)?, Value::Bool(true)))
}
