//! Reply classification.
//!
//! The bridge module signals failure two ways: a protocol-level `error`
//! key next to `result`, and a soft `{"error": true, "message": ...}` flag
//! inside an otherwise successful `result`.  Both collapse into
//! [`OperationResult`] here so call sites never check them ad hoc.

use serde_json::Value;

use ob_domain::error::Error;

use crate::transport::TransportError;

/// Message used when a soft error carries no `message`.
///
/// Kept for compatibility with the backend contract even though it hides
/// genuinely missing fields; occurrences are logged at `warn`.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Discriminated outcome of one backend exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult {
    /// Payload: `result.data` when present, else `result`.
    Success(Value),
    ApplicationError(String),
    MalformedReply(String),
    TransportError(TransportError),
}

impl OperationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, OperationResult::Success(_))
    }

    /// Short tag used in trace events.
    pub fn outcome(&self) -> &'static str {
        match self {
            OperationResult::Success(_) => "success",
            OperationResult::ApplicationError(_) => "application_error",
            OperationResult::MalformedReply(_) => "malformed_reply",
            OperationResult::TransportError(_) => "transport_error",
        }
    }

    pub fn into_result(self) -> Result<Value, Error> {
        match self {
            OperationResult::Success(v) => Ok(v),
            OperationResult::ApplicationError(msg) => Err(Error::Application(msg)),
            OperationResult::MalformedReply(msg) => Err(Error::MalformedReply(msg)),
            OperationResult::TransportError(e) => Err(e.into()),
        }
    }
}

impl From<TransportError> for OperationResult {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::InvalidBody(msg) => OperationResult::MalformedReply(msg),
            other => OperationResult::TransportError(other),
        }
    }
}

/// Classify a decoded reply.  First match wins:
///
/// 1. top-level `error` → `ApplicationError` (`error.data.message`, else the
///    error object as a string);
/// 2. `result.error == true` → `ApplicationError` (`result.message`, else
///    [`UNKNOWN_ERROR`]);
/// 3. `result` present → `Success` (`result.data`, else `result`).
///
/// Anything else is a `MalformedReply`.
pub fn interpret(raw: &Value) -> OperationResult {
    let Some(obj) = raw.as_object() else {
        return OperationResult::MalformedReply(format!(
            "expected a JSON object, got {}",
            type_name(raw)
        ));
    };

    if let Some(error) = obj.get("error") {
        return OperationResult::ApplicationError(protocol_error_message(error));
    }

    let Some(result) = obj.get("result") else {
        return OperationResult::MalformedReply(
            "reply has neither \"result\" nor \"error\"".into(),
        );
    };

    if let Some(res) = result.as_object() {
        if res.get("error").and_then(Value::as_bool) == Some(true) {
            let message = match res.get("message").and_then(Value::as_str) {
                Some(m) => m.to_owned(),
                None => {
                    tracing::warn!("soft error without message, reporting \"{UNKNOWN_ERROR}\"");
                    UNKNOWN_ERROR.to_owned()
                }
            };
            return OperationResult::ApplicationError(message);
        }

        if let Some(data) = res.get("data") {
            return OperationResult::Success(data.clone());
        }
    }

    OperationResult::Success(result.clone())
}

fn protocol_error_message(error: &Value) -> String {
    if let Some(msg) = error
        .get("data")
        .and_then(|d| d.get("message"))
        .and_then(Value::as_str)
    {
        return msg.to_owned();
    }
    match error {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
