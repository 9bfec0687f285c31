//! Human-readable rendering of backend payloads.
//!
//! Everything here is pure: the same input always yields the same text.
//! Field values are classified once ([`FieldValue::classify`]) and every
//! renderer works off that classification.

use std::collections::BTreeMap;

use serde_json::Value;

use ob_domain::error::Error;

use crate::types::{FieldInfo, ModelInfo, Record};

/// Collections longer than this are truncated with `...`.
const COLLECTION_PREVIEW: usize = 5;

/// Keys never shown in the single-record view.
const HIDDEN_KEYS: &[&str] = &["id", "display_name", "__last_update"];

/// Keys never shown in list entries (the name is already in the heading).
const HIDDEN_LIST_KEYS: &[&str] = &["id", "display_name", "name", "__last_update"];

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Value classification
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// How a field value is displayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// `null`, `false`, `""` or `[]`; omitted from output.
    Empty,
    /// String, number or `true`.
    Scalar(&'a Value),
    /// A `[id, label]` pair pointing at another record.
    Relation { id: i64, label: &'a str },
    /// Any other list.
    Collection(&'a [Value]),
    /// Objects, rendered as compact JSON.
    Other(&'a Value),
}

impl<'a> FieldValue<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Null | Value::Bool(false) => FieldValue::Empty,
            Value::String(s) if s.is_empty() => FieldValue::Empty,
            Value::Array(items) if items.is_empty() => FieldValue::Empty,
            Value::Array(items) => match items.as_slice() {
                [Value::Number(id), Value::String(label)] if id.is_i64() => FieldValue::Relation {
                    id: id.as_i64().unwrap_or_default(),
                    label: label.as_str(),
                },
                _ => FieldValue::Collection(items),
            },
            Value::Object(_) => FieldValue::Other(value),
            _ => FieldValue::Scalar(value),
        }
    }

    /// Display text, `None` for [`FieldValue::Empty`].
    pub fn render(&self) -> Option<String> {
        match self {
            FieldValue::Empty => None,
            FieldValue::Scalar(v) => Some(scalar_text(v)),
            FieldValue::Relation { id, label } => Some(format!("{label} (ID: {id})")),
            FieldValue::Collection(items) => {
                let preview: Vec<String> = items
                    .iter()
                    .take(COLLECTION_PREVIEW)
                    .map(Value::to_string)
                    .collect();
                let more = if items.len() > COLLECTION_PREVIEW { "..." } else { "" };
                Some(format!("{} items: [{}]{more}", items.len(), preview.join(", ")))
            }
            FieldValue::Other(v) => Some(v.to_string()),
        }
    }
}

fn scalar_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn field_line(key: &str, text: &str) -> String {
    format!("- {key}: {text}")
}

/// Heading label: `display_name`, then `name`, then `ID {id}`.
fn record_title(record: &Record) -> String {
    ["display_name", "name"]
        .iter()
        .filter_map(|k| record.get(*k))
        .find_map(|v| match FieldValue::classify(v) {
            FieldValue::Scalar(s) => Some(scalar_text(s)),
            _ => None,
        })
        .unwrap_or_else(|| format!("ID {}", record_id(record)))
}

fn record_id(record: &Record) -> String {
    match record.get("id") {
        Some(Value::Null) | None => "?".into(),
        Some(v) => scalar_text(v),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Records
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Render one record with its fields grouped into sections.
///
/// ```text
/// # res.partner: Acme (ID: 7)
///
/// ## Basic Information
/// - email: info@acme.test
///
/// ## Related Records
/// - country_id: Belgium (ID: 21)
/// ```
pub fn format_record(model: &str, record: &Record) -> String {
    if record.is_empty() {
        return "Record not found.".into();
    }

    let mut basic = Vec::new();
    let mut related = Vec::new();
    let mut other = Vec::new();

    for (key, value) in record {
        if HIDDEN_KEYS.contains(&key.as_str()) {
            continue;
        }
        let class = FieldValue::classify(value);
        let Some(text) = class.render() else { continue };
        let line = field_line(key, &text);
        match class {
            FieldValue::Scalar(_) => basic.push(line),
            FieldValue::Relation { .. } => related.push(line),
            _ => other.push(line),
        }
    }

    let mut out = format!("# {model}: {} (ID: {})", record_title(record), record_id(record));
    for (title, lines) in [
        ("Basic Information", basic),
        ("Related Records", related),
        ("Other Data", other),
    ] {
        if lines.is_empty() {
            continue;
        }
        out.push_str("\n\n## ");
        out.push_str(title);
        for line in lines {
            out.push('\n');
            out.push_str(&line);
        }
    }
    out
}

/// Render a search result as a list of short entries.
pub fn format_records(model: &str, records: &[Record]) -> String {
    if records.is_empty() {
        return format!("No records found in {model}.");
    }

    let mut blocks = vec![format!("# Found {} records in {model}", records.len())];
    for record in records {
        let mut block = format!("## {} (ID: {})", record_title(record), record_id(record));
        for (key, value) in record {
            if HIDDEN_LIST_KEYS.contains(&key.as_str()) {
                continue;
            }
            if let Some(text) = FieldValue::classify(value).render() {
                block.push('\n');
                block.push_str(&field_line(key, &text));
            }
        }
        blocks.push(block);
    }
    blocks.join("\n\n")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Introspection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub fn format_models(models: &[ModelInfo]) -> String {
    if models.is_empty() {
        return "No models are currently enabled for MCP access.".into();
    }

    let mut out = String::from("# Available Models\n");
    for m in models {
        let perms = m.permissions();
        let perms = if perms.is_empty() {
            "no permissions".to_owned()
        } else {
            perms.join(", ")
        };
        let name = m.name.as_deref().unwrap_or("Unknown");
        out.push_str(&format!("\n- {} ({name}): {perms}", m.model));
    }
    out
}

/// Fields grouped by type (types sorted, fields sorted by name).
/// `types` restricts the output when non-empty.
pub fn format_fields(model: &str, fields: &[FieldInfo], types: &[String]) -> String {
    let mut groups: BTreeMap<&str, Vec<&FieldInfo>> = BTreeMap::new();
    for f in fields {
        let ty = f.field_type.as_deref().unwrap_or("unknown");
        if !types.is_empty() && !types.iter().any(|t| t == ty) {
            continue;
        }
        groups.entry(ty).or_default().push(f);
    }

    if groups.is_empty() {
        return format!("No fields found for {model}.");
    }

    let mut out = format!("# Fields for {model}");
    for (ty, mut members) in groups {
        members.sort_by(|a, b| a.name.cmp(&b.name));
        out.push_str(&format!("\n\n## {} Fields", capitalize(ty)));
        for f in members {
            let label = f.label.as_deref().unwrap_or(&f.name);
            out.push_str(&format!("\n- {}: {label}", f.name));
            if f.required {
                out.push_str(" (required)");
            }
            if f.readonly {
                out.push_str(" [readonly]");
            }
        }
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Mutations and scalars
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub fn format_count(model: &str, count: u64, domain: &[Value]) -> String {
    if domain.is_empty() {
        format!("Found {count} records in {model}.")
    } else {
        format!(
            "Found {count} records in {model} matching {}.",
            Value::Array(domain.to_vec())
        )
    }
}

pub fn format_created(model: &str, id: Option<i64>) -> String {
    match id {
        Some(id) => format!("Successfully created {model} record with ID {id}."),
        None => format!("Successfully created {model} record."),
    }
}

pub fn format_updated(model: &str, record_id: i64, values: &Record) -> String {
    let keys: Vec<&str> = values.keys().map(String::as_str).collect();
    format!(
        "Successfully updated {model} record {record_id}. Fields: {}",
        keys.join(", ")
    )
}

pub fn format_deleted(model: &str, record_id: i64) -> String {
    format!("Successfully deleted {model} record {record_id}.")
}

pub fn format_execute(model: &str, method: &str, result: &Value) -> String {
    if result.is_null() {
        return format!("Method {method} executed successfully on {model}.");
    }
    let body = serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string());
    format!("Method {method} result:\n{body}")
}

/// Short diagnostic naming the action, its target, and the underlying message.
pub fn describe_failure(action: &str, target: &str, err: &Error) -> String {
    format!("Error {action} {target}: {}", err.untagged())
}
