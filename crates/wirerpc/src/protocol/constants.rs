//! Protocol Constants
//!
//! This module defines constants for the JSON-RPC 2.0 wire protocol and the
//! endpoint defaults, to ensure consistency and reduce typos.

/// Protocol version emitted in every message and verified on receipt
pub const JSONRPC_VERSION: &str = "2.0";

/// Response id used when the server cannot correlate a request
///
/// A received request without an id (a notification in JSON-RPC terms) is
/// treated as a request carrying this id.
pub const UNKNOWN_ID: &str = "unknown";

/// JSON-RPC error codes
pub mod error_codes {
    /// Parse error - malformed frame or invalid JSON was received
    pub const PARSE_ERROR: i32 = -32700;

    /// Invalid Request - oversized or structurally invalid request
    pub const INVALID_REQUEST: i32 = -32600;

    /// Method not found - the handler rejected the method
    pub const METHOD_NOT_FOUND: i32 = -32601;

    /// Invalid params - the handler rejected the parameters
    pub const INVALID_PARAMS: i32 = -32602;

    /// Internal error - the handler raised, or the connection failed
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Default values for endpoint configuration
pub mod defaults {
    /// Default inbound-read idle timeout in seconds
    pub const TIMEOUT_SECONDS: u64 = 5;

    /// Default accept queue depth for the server listener
    pub const BACKLOG: u32 = 256;

    /// Maximum size of a single frame in bytes
    pub const MAX_PAYLOAD_BYTES: usize = 1_000_000;

    /// Capacity of the per-connection outbound channel
    pub const OUTBOUND_QUEUE: usize = 64;
}
