//! `odoo://` resources.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use ob_backend::format::format_record;
use ob_backend::RecordStore;
use ob_domain::trace::TraceEvent;

use crate::protocol::{JsonRpcError, ResourceContent, ResourceDef, ResourceTemplateDef};

const SCHEME: &str = "odoo://";

/// A parsed resource URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceUri {
    /// `odoo://models`
    Models,
    /// `odoo://model/{model}/fields`
    ModelFields(String),
    /// `odoo://{model}/record/{id}`
    Record { model: String, id: i64 },
    /// `odoo://{model}/count`
    Count(String),
}

impl FromStr for ResourceUri {
    type Err = JsonRpcError;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        let unknown = || JsonRpcError::invalid_params(format!("Unknown resource: {uri}"));
        let path = uri.strip_prefix(SCHEME).ok_or_else(unknown)?;
        let parts: Vec<&str> = path.split('/').collect();

        match parts.as_slice() {
            ["models"] => Ok(ResourceUri::Models),
            ["model", model, "fields"] if !model.is_empty() => {
                Ok(ResourceUri::ModelFields((*model).to_owned()))
            }
            [model, "record", id] if !model.is_empty() => {
                let id = id.parse().map_err(|_| {
                    JsonRpcError::invalid_params(format!("Invalid record id in resource: {uri}"))
                })?;
                Ok(ResourceUri::Record {
                    model: (*model).to_owned(),
                    id,
                })
            }
            [model, "count"] if !model.is_empty() => Ok(ResourceUri::Count((*model).to_owned())),
            _ => Err(unknown()),
        }
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceUri::Models => write!(f, "{SCHEME}models"),
            ResourceUri::ModelFields(m) => write!(f, "{SCHEME}model/{m}/fields"),
            ResourceUri::Record { model, id } => write!(f, "{SCHEME}{model}/record/{id}"),
            ResourceUri::Count(m) => write!(f, "{SCHEME}{m}/count"),
        }
    }
}

/// Concrete resources for `resources/list`.
pub fn resource_list() -> Vec<ResourceDef> {
    vec![ResourceDef {
        uri: ResourceUri::Models.to_string(),
        name: "models".into(),
        description: "List all models enabled for MCP access".into(),
        mime_type: "application/json".into(),
    }]
}

/// Parameterised resources for `resources/templates/list`.
pub fn resource_templates() -> Vec<ResourceTemplateDef> {
    let template = |uri: &str, name: &str, description: &str, mime: &str| ResourceTemplateDef {
        uri_template: uri.into(),
        name: name.into(),
        description: description.into(),
        mime_type: mime.into(),
    };
    vec![
        template(
            "odoo://model/{model_name}/fields",
            "model_fields",
            "Field definitions for a specific model",
            "application/json",
        ),
        template(
            "odoo://{model_name}/record/{record_id}",
            "record",
            "A specific record by ID, e.g. odoo://res.partner/record/1",
            "text/markdown",
        ),
        template(
            "odoo://{model_name}/count",
            "record_count",
            "Count of all records in a model",
            "application/json",
        ),
    ]
}

/// Resolve a resource against the store.
pub async fn read_resource(store: &dyn RecordStore, uri: &str) -> Result<ResourceContent, JsonRpcError> {
    let parsed: ResourceUri = uri.parse()?;
    let result = render(store, &parsed).await;

    TraceEvent::ResourceRead {
        uri: uri.to_owned(),
        ok: result.is_ok(),
    }
    .emit();

    let (mime_type, text) = result.map_err(|e| {
        tracing::warn!(%uri, error = %e, "resource read failed");
        JsonRpcError::internal(e.untagged().to_string())
    })?;

    Ok(ResourceContent {
        uri: uri.to_owned(),
        mime_type: mime_type.into(),
        text,
    })
}

async fn render(
    store: &dyn RecordStore,
    uri: &ResourceUri,
) -> ob_domain::error::Result<(&'static str, String)> {
    match uri {
        ResourceUri::Models => {
            let models = store.list_models().await?;
            Ok(("application/json", pretty(&serde_json::to_value(models)?)))
        }
        ResourceUri::ModelFields(model) => {
            let fields = store.get_fields(model).await?;
            Ok(("application/json", pretty(&serde_json::to_value(fields)?)))
        }
        ResourceUri::Record { model, id } => {
            let record = store.read(model, *id, None).await?;
            Ok(("text/markdown", format_record(model, &record)))
        }
        ResourceUri::Count(model) => {
            let count = store.count(model, Vec::new()).await?;
            Ok((
                "application/json",
                json!({ "model": model, "count": count }).to_string(),
            ))
        }
    }
}

fn pretty(v: &Value) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}
