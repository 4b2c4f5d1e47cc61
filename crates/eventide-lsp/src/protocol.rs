//! JSON-RPC 2.0 envelope model: request ids, parsed incoming messages, and
//! the handful of error-code constants the dispatcher emits.

use serde_json::Value;

/// A JSON-RPC request id: either an integer or a string, per the spec.
///
/// The dispatcher never manufactures an id of a different type than the one
/// a caller supplied — a response always carries back exactly the variant
/// it arrived as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestId {
    /// An integer id, rendered on the wire as a bare decimal.
    Int(i64),
    /// A string id, rendered through `serde_json`'s string encoder.
    Str(String),
}

impl RequestId {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(RequestId::Int),
            Value::String(s) => Some(RequestId::Str(s.clone())),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            RequestId::Int(n) => Value::Number((*n).into()),
            RequestId::Str(s) => Value::String(s.clone()),
        }
    }
}

/// `-32601`, per the JSON-RPC 2.0 spec: no handler is registered for the
/// requested method.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// `-32603`, per the JSON-RPC 2.0 spec: the server failed to produce a
/// well-formed response after a handler otherwise succeeded.
pub const INTERNAL_ERROR: i64 = -32603;
/// `-32803`, an LSP extension: the handler itself reported failure.
pub const REQUEST_FAILED: i64 = -32803;

/// A JSON-RPC message parsed off the wire, before routing.
///
/// Only `method`, `id`, and `params` are consulted; any other field present
/// in the source object (including `jsonrpc`, `result`, `error`) is ignored.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// The requested method, if present. Absent on responses, which this
    /// server never expects to receive and silently drops.
    pub method: Option<String>,
    /// The request id, present on requests, absent on notifications.
    pub id: Option<RequestId>,
    /// Raw, still-unparsed parameters. Defaults to `Value::Null` when the
    /// field was omitted, so a zero-arg handler can deserialize it as `()`.
    pub params: Value,
}

impl IncomingMessage {
    /// `true` when this message has no `method` — an envelope the
    /// dispatcher was never meant to see (a response, or malformed
    /// `params`-only traffic) and that the main loop drops silently.
    #[must_use]
    pub fn is_unroutable(&self) -> bool {
        self.method.is_none()
    }

    /// `true` when `id` is present: this is a request expecting exactly one
    /// reply, as opposed to a notification.
    #[must_use]
    pub fn is_request(&self) -> bool {
        self.id.is_some()
    }
}

/// Parse one JSON-RPC payload.
///
/// Uses `serde_json::Value` rather than a zero-copy streaming parser since
/// the dispatcher needs the whole object shape up front; `serde_json`
/// already rejects trailing content after the top-level value via
/// `from_str`, matching the spec's "trailing content is a parse failure"
/// requirement.
///
/// # Errors
/// Returns the `serde_json` parse error's message on malformed JSON or a
/// JSON value that is not an object.
pub fn parse_incoming_message(payload: &str) -> Result<IncomingMessage, String> {
    let value: Value = serde_json::from_str(payload).map_err(|e| e.to_string())?;
    let object = value
        .as_object()
        .ok_or_else(|| "JSON-RPC payload must be an object".to_string())?;

    let method = match object.get("method") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Null) | None => None,
        Some(_) => return Err("method must be a string".to_string()),
    };

    let id = match object.get("id") {
        Some(v) if !v.is_null() => {
            Some(RequestId::from_value(v).ok_or("request id must be integer or string")?)
        }
        _ => None,
    };

    let params = object.get("params").cloned().unwrap_or(Value::Null);

    Ok(IncomingMessage { method, id, params })
}

/// Build `{"jsonrpc":"2.0","id":<id>,"result":<result>}`.
#[must_use]
pub fn build_success_response(id: &RequestId, result: Value) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id.to_value(),
        "result": result,
    })
    .to_string()
}

/// Build `{"jsonrpc":"2.0","id":<id>,"error":{"code":<code>,"message":<message>}}`.
#[must_use]
pub fn build_error_response(id: &RequestId, code: i64, message: &str) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id.to_value(),
        "error": {
            "code": code,
            "message": message,
        },
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_with_integer_id() {
        let msg = parse_incoming_message(
            r#"{"jsonrpc":"2.0","id":1,"method":"test/add","params":{"a":2,"b":3}}"#,
        )
        .unwrap();
        assert_eq!(msg.method.as_deref(), Some("test/add"));
        assert_eq!(msg.id, Some(RequestId::Int(1)));
        assert!(msg.is_request());
    }

    #[test]
    fn parses_notification_with_no_id() {
        let msg =
            parse_incoming_message(r#"{"jsonrpc":"2.0","method":"test/note","params":{}}"#)
                .unwrap();
        assert_eq!(msg.id, None);
        assert!(!msg.is_request());
        assert!(!msg.is_unroutable());
    }

    #[test]
    fn params_default_to_null_when_absent() {
        let msg = parse_incoming_message(r#"{"jsonrpc":"2.0","method":"ping"}"#).unwrap();
        assert_eq!(msg.params, Value::Null);
    }

    #[test]
    fn message_with_no_method_is_unroutable() {
        let msg = parse_incoming_message(r#"{"jsonrpc":"2.0","params":{"x":1}}"#).unwrap();
        assert!(msg.is_unroutable());
    }

    #[test]
    fn string_ids_round_trip() {
        let msg =
            parse_incoming_message(r#"{"jsonrpc":"2.0","id":"abc","method":"m"}"#).unwrap();
        assert_eq!(msg.id, Some(RequestId::Str("abc".to_string())));
        let response = build_success_response(&RequestId::Str("abc".to_string()), Value::Null);
        assert!(response.contains("\"id\":\"abc\""));
    }

    #[test]
    fn trailing_content_after_object_is_rejected() {
        let err = parse_incoming_message(r#"{"jsonrpc":"2.0","method":"m"} garbage"#);
        assert!(err.is_err());
    }

    #[test]
    fn integer_ids_render_without_quotes() {
        let response = build_success_response(&RequestId::Int(9), Value::Null);
        assert!(response.contains("\"id\":9"));
    }

    #[test]
    fn error_response_carries_code_and_message() {
        let response = build_error_response(&RequestId::Int(9), METHOD_NOT_FOUND, "missing");
        let parsed: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(parsed["error"]["code"], -32601);
        assert_eq!(parsed["error"]["message"], "missing");
    }
}
