//! JSON-RPC 2.0 message types and codec.
//!
//! Frames are plain JSON objects. Decoding tolerates any field order,
//! accepts both integer and string request identifiers, and rejects frames
//! that do not carry `jsonrpc: "2.0"`. The three frame kinds are
//! discriminated structurally: a request has `method` and `id`, a response
//! has `id` but no `method`, a notification has `method` but no `id`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::error_codes;

/// JSON-RPC version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Marker for the `jsonrpc` field.
///
/// This codec speaks 2.0 only, so the field carries no data: it serializes
/// as the literal `"2.0"` and refuses anything else on decode, which is
/// what rejects non-JSON-RPC objects early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonRpcVersion;

impl Serialize for JsonRpcVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        JSONRPC_VERSION.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for JsonRpcVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct VersionVisitor;

        impl Visitor<'_> for VersionVisitor {
            type Value = JsonRpcVersion;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "the string \"{JSONRPC_VERSION}\"")
            }

            fn visit_str<E>(self, value: &str) -> Result<JsonRpcVersion, E>
            where
                E: de::Error,
            {
                if value == JSONRPC_VERSION {
                    Ok(JsonRpcVersion)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(value), &self))
                }
            }
        }

        deserializer.deserialize_str(VersionVisitor)
    }
}

/// Request identifier - can be a string or a number.
///
/// The side that issues a request chooses the representation; the peer
/// echoes the exact same type back in the response. Each side has its own
/// identifier space, so the two directions never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// String identifier
    String(String),
    /// Numeric identifier
    Number(i64),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

/// JSON-RPC request message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version
    pub jsonrpc: JsonRpcVersion,
    /// Request method name
    pub method: String,
    /// Request parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Request identifier
    pub id: RequestId,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC request
    pub fn new(method: impl Into<String>, params: Option<Value>, id: RequestId) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            method: method.into(),
            params,
            id,
        }
    }

    /// Create a request with serializable parameters
    pub fn with_params<P: Serialize>(
        method: impl Into<String>,
        params: P,
        id: RequestId,
    ) -> Result<Self, serde_json::Error> {
        let params_value = serde_json::to_value(params)?;
        Ok(Self::new(method, Some(params_value), id))
    }
}

/// JSON-RPC notification message (no response expected)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    /// JSON-RPC version
    pub jsonrpc: JsonRpcVersion,
    /// Notification method name
    pub method: String,
    /// Notification parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    /// Create a new JSON-RPC notification
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            method: method.into(),
            params,
        }
    }

    /// Create a notification with serializable parameters
    pub fn with_params<P: Serialize>(
        method: impl Into<String>,
        params: P,
    ) -> Result<Self, serde_json::Error> {
        let params_value = serde_json::to_value(params)?;
        Ok(Self::new(method, Some(params_value)))
    }
}

/// JSON-RPC error object.
///
/// Codes follow the standard taxonomy: `-32700` parse error, `-32600`
/// invalid request, `-32601` method not found, `-32602` invalid params,
/// `-32603` internal error, everything else application-defined. The
/// numeric constants live in [`crate::error_codes`]; the richer
/// classification of peer errors is [`crate::error::Error::rpc`]'s job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Create a new error object with a code and message
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attach structured data to the error
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// The two mutually exclusive outcomes a response can carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcResponsePayload {
    /// Successful response with result
    Success {
        /// Response result
        result: Value,
    },
    /// Error response
    Error {
        /// Response error
        error: JsonRpcError,
    },
}

/// Response correlation id.
///
/// Almost always the echoed request id; responses to frames whose id could
/// not be recovered (parse failures) carry JSON `null` instead, which maps
/// to the `None` case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseId(pub Option<RequestId>);

/// JSON-RPC response message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version
    pub jsonrpc: JsonRpcVersion,
    /// Response payload (either result or error, never both)
    #[serde(flatten)]
    pub payload: JsonRpcResponsePayload,
    /// Request identifier (null only for parse errors)
    pub id: ResponseId,
}

impl JsonRpcResponse {
    /// Answer `id` with a result value.
    pub fn ok(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            payload: JsonRpcResponsePayload::Success { result },
            id: ResponseId(Some(id)),
        }
    }

    /// Answer `id` with an error object.
    pub fn err(id: RequestId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            payload: JsonRpcResponsePayload::Error { error },
            id: ResponseId(Some(id)),
        }
    }

    /// Answer an unparseable frame: `-32700` addressed to a `null` id.
    pub fn parse_failure(detail: impl Into<String>) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            payload: JsonRpcResponsePayload::Error {
                error: JsonRpcError::new(error_codes::PARSE_ERROR, detail),
            },
            id: ResponseId(None),
        }
    }

    /// The result value, when this response succeeded.
    pub fn result(&self) -> Option<&Value> {
        match &self.payload {
            JsonRpcResponsePayload::Success { result } => Some(result),
            JsonRpcResponsePayload::Error { .. } => None,
        }
    }

    /// The error object, when this response failed.
    pub fn error(&self) -> Option<&JsonRpcError> {
        match &self.payload {
            JsonRpcResponsePayload::Success { .. } => None,
            JsonRpcResponsePayload::Error { error } => Some(error),
        }
    }

    /// Whether this response carries a result rather than an error.
    pub fn is_success(&self) -> bool {
        self.result().is_some()
    }

    /// Id of the request this answers; `None` for parse-failure responses.
    pub fn request_id(&self) -> Option<&RequestId> {
        self.id.0.as_ref()
    }
}

/// JSON-RPC message type (union of request, response, notification).
///
/// Variant order matters for untagged deserialization: a request frame
/// carries both `method` and `id`, so it must be tried before the
/// notification variant, which would otherwise match it by ignoring the
/// extra `id` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    /// Request message
    Request(JsonRpcRequest),
    /// Response message
    Response(JsonRpcResponse),
    /// Notification message
    Notification(JsonRpcNotification),
}

/// Parse a single JSON-RPC frame from raw bytes
pub fn parse_message(bytes: &[u8]) -> Result<JsonRpcMessage, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Serialize a JSON-RPC frame to bytes
pub fn encode_message(message: &JsonRpcMessage) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(message)
}

/// Recover the `id` field from a malformed frame, if the bytes are at
/// least valid JSON and the field is a string or a number.
///
/// Used to answer parse failures with a `-32700` error response addressed
/// to the offending request.
pub fn recover_id(bytes: &[u8]) -> Option<RequestId> {
    let value: Value = serde_json::from_slice(bytes).ok()?;
    match value.get("id")? {
        Value::String(s) => Some(RequestId::String(s.clone())),
        Value::Number(n) => n.as_i64().map(RequestId::Number),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_version_marker_is_the_literal_two_point_zero() {
        assert_eq!(serde_json::to_string(&JsonRpcVersion).unwrap(), "\"2.0\"");
        assert!(serde_json::from_str::<JsonRpcVersion>("\"2.0\"").is_ok());
    }

    #[test]
    fn test_version_marker_refuses_other_versions() {
        let error = serde_json::from_str::<JsonRpcVersion>("\"1.1\"").unwrap_err();
        assert!(error.to_string().contains("2.0"), "error was: {error}");
        assert!(serde_json::from_str::<JsonRpcVersion>("2").is_err());
    }

    #[test]
    fn test_request_id_round_trip() {
        let string_id: RequestId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(string_id, RequestId::String("abc".to_string()));

        let numeric_id: RequestId = serde_json::from_str("42").unwrap();
        assert_eq!(numeric_id, RequestId::Number(42));

        assert_eq!(serde_json::to_string(&numeric_id).unwrap(), "42");
    }

    #[test]
    fn test_message_classification() {
        let request = parse_message(br#"{"jsonrpc":"2.0","method":"ping","id":1}"#).unwrap();
        assert!(matches!(request, JsonRpcMessage::Request(_)));

        let response = parse_message(br#"{"jsonrpc":"2.0","result":{},"id":1}"#).unwrap();
        assert!(matches!(response, JsonRpcMessage::Response(_)));

        let notification =
            parse_message(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
        assert!(matches!(notification, JsonRpcMessage::Notification(_)));
    }

    #[test]
    fn test_field_order_tolerated() {
        let request =
            parse_message(br#"{"id":"r-1","params":{"a":1},"method":"tools/call","jsonrpc":"2.0"}"#)
                .unwrap();
        match request {
            JsonRpcMessage::Request(req) => {
                assert_eq!(req.method, "tools/call");
                assert_eq!(req.id, RequestId::String("r-1".to_string()));
            }
            other => panic!("expected request, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_version_rejected() {
        assert!(parse_message(br#"{"method":"ping","id":1}"#).is_err());
    }

    #[test]
    fn test_response_constructors_and_accessors() {
        let ok = JsonRpcResponse::ok(RequestId::Number(1), json!({"x": 1}));
        assert!(ok.is_success());
        assert_eq!(ok.result().unwrap()["x"], 1);
        assert!(ok.error().is_none());
        assert_eq!(ok.request_id(), Some(&RequestId::Number(1)));
        // A success never serializes an `error` key.
        assert!(serde_json::to_value(&ok).unwrap().get("error").is_none());

        let err = JsonRpcResponse::err(
            RequestId::from("r-9"),
            JsonRpcError::new(error_codes::METHOD_NOT_FOUND, "no such method"),
        );
        assert!(!err.is_success());
        assert!(err.result().is_none());
        assert_eq!(err.error().unwrap().code, -32601);
        assert_eq!(err.request_id(), Some(&RequestId::from("r-9")));
    }

    #[test]
    fn test_parse_failure_goes_to_null_id() {
        let response = JsonRpcResponse::parse_failure("unreadable frame");
        assert!(response.request_id().is_none());

        let wire = serde_json::to_value(&response).unwrap();
        assert_eq!(wire["id"], Value::Null);
        assert_eq!(wire["error"]["code"], json!(error_codes::PARSE_ERROR));
        assert_eq!(wire["error"]["message"], "unreadable frame");
    }

    #[test]
    fn test_error_object_with_data() {
        let error = JsonRpcError::new(-32042, "boom").with_data(json!({"detail": 7}));
        let wire = serde_json::to_value(&error).unwrap();
        assert_eq!(wire["code"], -32042);
        assert_eq!(wire["data"]["detail"], 7);

        let bare = JsonRpcError::new(error_codes::INTERNAL_ERROR, "oops");
        assert!(serde_json::to_value(&bare).unwrap().get("data").is_none());
    }

    #[test]
    fn test_recover_id() {
        assert_eq!(
            recover_id(br#"{"id":7,"method":"x"}"#),
            Some(RequestId::Number(7))
        );
        assert_eq!(
            recover_id(br#"{"id":"abc"}"#),
            Some(RequestId::String("abc".to_string()))
        );
        assert_eq!(recover_id(br#"{"id":null}"#), None);
        assert_eq!(recover_id(b"not json"), None);
    }

    #[test]
    fn test_notification_serialization() {
        let notification = JsonRpcNotification::new("notifications/initialized", None);
        let wire = serde_json::to_value(&notification).unwrap();
        assert!(wire.get("params").is_none());
        assert!(wire.get("id").is_none());
    }
}
