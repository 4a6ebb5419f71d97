//! JSON-RPC 2.0 Message Implementation
//!
//! This module provides the typed request/response records exchanged over a
//! connection, with shared serialization behavior through the
//! [`JsonRpcMessage`] trait.
//!
//! Batch requests and outbound notifications are not part of the wire
//! surface. A *received* id-less request (a notification in JSON-RPC terms)
//! deserializes as a request with id `"unknown"` and is answered like any
//! other request.
//!
//! # Examples
//!
//! ```rust
//! use wirerpc::protocol::{JsonRpcMessage, JsonRpcRequest, RpcValue};
//!
//! let request = JsonRpcRequest::new("add", RpcValue::from(vec![1.into(), 2.into()]), "req-1");
//! let json = request.to_json().unwrap();
//! let parsed = JsonRpcRequest::from_json(&json).unwrap();
//! assert_eq!(request, parsed);
//! ```

// Layer 2: Third-party crate imports
use bytes::{BufMut, Bytes, BytesMut};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

// Layer 3: Internal module imports
use crate::protocol::constants::{JSONRPC_VERSION, UNKNOWN_ID};
use crate::protocol::RpcValue;

fn unknown_id() -> String {
    UNKNOWN_ID.to_string()
}

/// Trait for JSON-RPC message serialization and deserialization
///
/// Provides common functionality for the wire record types, ensuring
/// consistent serialization behavior. Any type implementing
/// `Serialize + Deserialize` gets the conversion methods for free; only
/// [`JsonRpcMessage::validate`] is record-specific.
pub trait JsonRpcMessage: Serialize + DeserializeOwned {
    /// Check structural validity of a received record
    ///
    /// Returns a human-readable description of the violation. The codec
    /// runs this on every inbound record; the protocol version string is
    /// always verified on receipt.
    fn validate(&self) -> Result<(), String>;

    /// Serialize this message to a JSON string
    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a JSON string
    fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize directly into a buffer, avoiding the intermediate String
    fn serialize_to_buffer(&self, buffer: &mut BytesMut) -> Result<(), serde_json::Error> {
        serde_json::to_writer(buffer.writer(), self)
    }

    /// Serialize this message to bytes
    fn to_bytes(&self) -> Result<Bytes, serde_json::Error> {
        let mut buffer = BytesMut::with_capacity(256);
        self.serialize_to_buffer(&mut buffer)?;
        Ok(buffer.freeze())
    }

    /// Deserialize a message from JSON bytes
    fn from_json_bytes(json: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(json)
    }
}

/// JSON-RPC 2.0 Request Message
///
/// # Specification Compliance
///
/// - `jsonrpc`: MUST be exactly "2.0"
/// - `method`: MUST be a non-empty String naming the method to invoke
/// - `params`: MAY be omitted; serialized absent when `None`
/// - `id`: non-empty String; this library never emits id-less requests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    /// Protocol version - always "2.0"
    pub jsonrpc: String,

    /// Name of the method to invoke
    pub method: String,

    /// Parameters for the method (object, array, or absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,

    /// Unique identifier for this request; `"unknown"` when the peer sent
    /// a notification
    #[serde(default = "unknown_id")]
    pub id: String,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request
    ///
    /// `RpcValue::None` params are serialized absent.
    pub fn new(method: impl Into<String>, params: RpcValue, id: impl Into<String>) -> Self {
        let params = match params {
            RpcValue::None => None,
            other => Some(Value::from(other)),
        };
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id: id.into(),
        }
    }

    /// The request parameters as an [`RpcValue`], `None` variant when absent
    pub fn params_value(&self) -> RpcValue {
        RpcValue::from(self.params.clone())
    }
}

impl JsonRpcMessage for JsonRpcRequest {
    fn validate(&self) -> Result<(), String> {
        if self.jsonrpc != JSONRPC_VERSION {
            return Err(format!("unsupported jsonrpc version {:?}", self.jsonrpc));
        }
        if self.method.is_empty() {
            return Err("empty method name".to_string());
        }
        if self.id.is_empty() {
            return Err("empty request id".to_string());
        }
        Ok(())
    }
}

/// JSON-RPC 2.0 Response Message
///
/// Carries exactly one of `result` or `error`; the absent side is omitted
/// from serialization. The id mirrors the originating request, or is
/// `"unknown"` when the server could not correlate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    /// Protocol version - always "2.0"
    pub jsonrpc: String,

    /// Result of a successful invocation (mutually exclusive with error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error information for a failed invocation (mutually exclusive with
    /// result)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,

    /// Request identifier from the original request
    #[serde(default = "unknown_id")]
    pub id: String,
}

impl JsonRpcResponse {
    /// Create a successful response
    pub fn success(result: Value, id: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id: id.into(),
        }
    }

    /// Create an error response
    pub fn failure(error: JsonRpcError, id: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(error),
            id: id.into(),
        }
    }
}

impl JsonRpcMessage for JsonRpcResponse {
    fn validate(&self) -> Result<(), String> {
        if self.jsonrpc != JSONRPC_VERSION {
            return Err(format!("unsupported jsonrpc version {:?}", self.jsonrpc));
        }
        // A response with neither result nor error is structurally intact
        // JSON; it surfaces to the caller as an invalid server response
        // rather than a codec failure.
        Ok(())
    }
}

/// JSON-RPC 2.0 Error Object
///
/// The `error` member of a response. Well-known codes live in
/// [`crate::protocol::constants::error_codes`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    /// Error code (see the JSON-RPC 2.0 specification)
    pub code: i32,

    /// Short human-readable description
    pub message: String,

    /// Optional structured error payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Create an error object with the given code and message
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create a parse error (-32700)
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(crate::protocol::constants::error_codes::PARSE_ERROR, message)
    }

    /// Create an invalid request error (-32600)
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(
            crate::protocol::constants::error_codes::INVALID_REQUEST,
            message,
        )
    }

    /// Create a method not found error (-32601)
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::new(
            crate::protocol::constants::error_codes::METHOD_NOT_FOUND,
            format!("method not found: {}", method.into()),
        )
    }

    /// Create an invalid params error (-32602)
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(
            crate::protocol::constants::error_codes::INVALID_PARAMS,
            message,
        )
    }

    /// Create an internal error (-32603)
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(
            crate::protocol::constants::error_codes::INTERNAL_ERROR,
            message,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_round_trip() {
        let request = JsonRpcRequest::new(
            "add",
            RpcValue::from(json!([1, 2])),
            "req-1",
        );

        let json = request.to_json().unwrap();
        let parsed = JsonRpcRequest::from_json(&json).unwrap();

        assert_eq!(request, parsed);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_request_omits_null_params() {
        let request = JsonRpcRequest::new("ping", RpcValue::None, "1");
        let json = request.to_json().unwrap();

        assert!(!json.contains("params"));
        assert!(json.contains(r#""jsonrpc":"2.0""#));
    }

    #[test]
    fn test_notification_deserializes_with_unknown_id() {
        let json = r#"{"jsonrpc":"2.0","method":"tick"}"#;
        let request = JsonRpcRequest::from_json(json).unwrap();

        assert_eq!(request.id, "unknown");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_validation_rejects_bad_version() {
        let json = r#"{"jsonrpc":"1.0","method":"m","id":"1"}"#;
        let request = JsonRpcRequest::from_json(json).unwrap();

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_validation_rejects_empty_method() {
        let json = r#"{"jsonrpc":"2.0","method":"","id":"1"}"#;
        let request = JsonRpcRequest::from_json(json).unwrap();

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_response_serialization_omits_absent_field() {
        let success = JsonRpcResponse::success(json!(3), "1");
        let success_json = success.to_json().unwrap();
        assert!(success_json.contains(r#""result":3"#));
        assert!(!success_json.contains("error"));

        let failure = JsonRpcResponse::failure(JsonRpcError::method_not_found("frob"), "2");
        let failure_json = failure.to_json().unwrap();
        assert!(failure_json.contains(r#""code":-32601"#));
        assert!(!failure_json.contains("result"));
    }

    #[test]
    fn test_response_round_trip_preserves_discriminant() {
        let success = JsonRpcResponse::success(json!({"v": [1, 2]}), "a");
        let parsed = JsonRpcResponse::from_json(&success.to_json().unwrap()).unwrap();
        assert_eq!(success, parsed);
        assert!(parsed.result.is_some());
        assert!(parsed.error.is_none());

        let failure = JsonRpcResponse::failure(JsonRpcError::internal_error("boom"), "b");
        let parsed = JsonRpcResponse::from_json(&failure.to_json().unwrap()).unwrap();
        assert_eq!(failure, parsed);
        assert!(parsed.result.is_none());
        assert!(parsed.error.is_some());
    }

    #[test]
    fn test_error_data_omitted_when_absent() {
        let error = JsonRpcError::parse_error("bad frame");
        let json = serde_json::to_string(&error).unwrap();
        assert!(!json.contains("data"));
    }

    #[test]
    fn test_bytes_round_trip() {
        let request = JsonRpcRequest::new("echo", RpcValue::from("x"), "1");
        let bytes = request.to_bytes().unwrap();
        let parsed = JsonRpcRequest::from_json_bytes(&bytes).unwrap();
        assert_eq!(request, parsed);
    }
}
