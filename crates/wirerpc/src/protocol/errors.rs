//! Protocol Error Types
//!
//! This module defines the client-facing RPC error taxonomy and its mapping
//! to and from the numeric JSON-RPC error codes. Codec and transport
//! failures live in [`crate::transport::error`]; the types here describe
//! failures a peer reported, or a response the library could not make sense
//! of.

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::protocol::constants::error_codes;
use crate::protocol::{JsonRpcError, JsonRpcResponse, RpcValue};

/// Classification of a failed call, derived from the peer's error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcErrorKind {
    /// The peer rejected the method (-32601)
    InvalidMethod,
    /// The peer rejected the parameters (-32602)
    InvalidParams,
    /// The request was oversized or structurally invalid (-32600)
    InvalidRequest,
    /// The peer's response was malformed (-32700, or missing both result
    /// and error)
    InvalidServerResponse,
    /// The peer raised, or returned an unrecognized code (-32603, others)
    OtherServerError,
}

impl RpcErrorKind {
    /// Derive the kind from a wire error code
    pub fn from_code(code: i32) -> Self {
        match code {
            error_codes::INVALID_REQUEST => RpcErrorKind::InvalidRequest,
            error_codes::METHOD_NOT_FOUND => RpcErrorKind::InvalidMethod,
            error_codes::INVALID_PARAMS => RpcErrorKind::InvalidParams,
            error_codes::PARSE_ERROR => RpcErrorKind::InvalidServerResponse,
            _ => RpcErrorKind::OtherServerError,
        }
    }

    /// The wire error code this kind serializes as
    pub fn code(&self) -> i32 {
        match self {
            RpcErrorKind::InvalidRequest => error_codes::INVALID_REQUEST,
            RpcErrorKind::InvalidMethod => error_codes::METHOD_NOT_FOUND,
            RpcErrorKind::InvalidParams => error_codes::INVALID_PARAMS,
            RpcErrorKind::InvalidServerResponse => error_codes::PARSE_ERROR,
            RpcErrorKind::OtherServerError => error_codes::INTERNAL_ERROR,
        }
    }
}

impl std::fmt::Display for RpcErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RpcErrorKind::InvalidMethod => "invalid method",
            RpcErrorKind::InvalidParams => "invalid params",
            RpcErrorKind::InvalidRequest => "invalid request",
            RpcErrorKind::InvalidServerResponse => "invalid server response",
            RpcErrorKind::OtherServerError => "server error",
        };
        f.write_str(name)
    }
}

/// A failed call: what the peer reported, classified
///
/// Handlers return this type to reject a request; the server encodes it
/// into the response's `error` member. Client-side, it is reconstructed
/// from the response's error code and message.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{kind}: {description}")]
pub struct RpcError {
    /// Classification derived from the error code
    pub kind: RpcErrorKind,
    /// The peer's error message
    pub description: String,
}

impl RpcError {
    /// Create an error of the given kind
    pub fn new(kind: RpcErrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }

    /// Handler rejection: unknown method
    pub fn invalid_method(method: impl Into<String>) -> Self {
        Self::new(
            RpcErrorKind::InvalidMethod,
            format!("method not found: {}", method.into()),
        )
    }

    /// Handler rejection: bad parameters
    pub fn invalid_params(description: impl Into<String>) -> Self {
        Self::new(RpcErrorKind::InvalidParams, description)
    }

    /// The response carried neither result nor error, or was otherwise
    /// not interpretable
    pub fn invalid_server_response() -> Self {
        Self::new(
            RpcErrorKind::InvalidServerResponse,
            "response carried neither result nor error",
        )
    }

    /// Handler failure that is not a method/params rejection
    pub fn other(description: impl Into<String>) -> Self {
        Self::new(RpcErrorKind::OtherServerError, description)
    }
}

impl From<RpcError> for JsonRpcError {
    fn from(err: RpcError) -> Self {
        JsonRpcError::new(err.kind.code(), err.description)
    }
}

impl JsonRpcResponse {
    /// Convert a received response into the user-facing call result
    ///
    /// `result` wins when present; an `error` member is classified by its
    /// code; a response carrying neither is an invalid server response.
    pub fn into_result(self) -> Result<RpcValue, RpcError> {
        if let Some(result) = self.result {
            return Ok(RpcValue::from(result));
        }
        match self.error {
            Some(error) => Err(RpcError {
                kind: RpcErrorKind::from_code(error.code),
                description: error.message,
            }),
            None => Err(RpcError::invalid_server_response()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_code_round_trip() {
        for kind in [
            RpcErrorKind::InvalidMethod,
            RpcErrorKind::InvalidParams,
            RpcErrorKind::InvalidRequest,
            RpcErrorKind::InvalidServerResponse,
            RpcErrorKind::OtherServerError,
        ] {
            assert_eq!(RpcErrorKind::from_code(kind.code()), kind);
        }
    }

    #[test]
    fn test_unrecognized_codes_classify_as_other() {
        assert_eq!(
            RpcErrorKind::from_code(-32000),
            RpcErrorKind::OtherServerError
        );
        assert_eq!(RpcErrorKind::from_code(7), RpcErrorKind::OtherServerError);
    }

    #[test]
    fn test_success_response_into_result() {
        let response = JsonRpcResponse::success(json!(3), "1");
        assert_eq!(response.into_result(), Ok(RpcValue::Integer(3)));
    }

    #[test]
    fn test_error_response_into_result() {
        let response =
            JsonRpcResponse::failure(JsonRpcError::method_not_found("frob"), "1");
        let err = response.into_result().unwrap_err();

        assert_eq!(err.kind, RpcErrorKind::InvalidMethod);
        assert!(err.description.contains("frob"));
    }

    #[test]
    fn test_empty_response_is_invalid_server_response() {
        let json = r#"{"jsonrpc":"2.0","id":"1"}"#;
        let response: JsonRpcResponse = serde_json::from_str(json).unwrap();
        let err = response.into_result().unwrap_err();

        assert_eq!(err.kind, RpcErrorKind::InvalidServerResponse);
    }
}
