//! wirerpc - JSON-RPC 2.0 over TCP with pluggable wire framing
//!
//! This crate provides symmetric TCP client and server endpoints speaking
//! JSON-RPC 2.0 over a framed byte stream, built on a small, layered
//! codec/dispatch stack.
//!
//! # Architecture
//!
//! Bytes flow upward through a linear pipeline per connection:
//!
//! - **Protocol Layer** (`protocol`): typed JSON-RPC 2.0 records, the
//!   [`RpcValue`] argument model, and the error taxonomy
//! - **Transport Layer** (`transport`): three interchangeable framers
//!   (newline, length-prefixed, brute-force JSON boundary detection) and
//!   the typed message codec over them
//! - **Correlation Layer** (`correlation`): the id-keyed pending-call
//!   table resolving outbound requests against inbound responses
//! - **Endpoint Layer** (`endpoint`): [`TcpServer`] dispatching requests
//!   to a user handler, [`TcpClient`] submitting calls, both enforcing a
//!   read-side idle timeout
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use wirerpc::{ClientConfig, RpcError, RpcValue, ServerConfig, TcpClient, TcpServer};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! async fn handler(method: String, params: RpcValue) -> Result<RpcValue, RpcError> {
//!     match method.as_str() {
//!         "echo" => Ok(params),
//!         other => Err(RpcError::invalid_method(other)),
//!     }
//! }
//!
//! let mut server = TcpServer::new(ServerConfig::default(), handler);
//! let addr = server.start("127.0.0.1:0".parse()?).await?;
//!
//! let mut client = TcpClient::new(ClientConfig::default());
//! client.connect(addr).await?;
//!
//! let echoed = client.call("echo", RpcValue::from(json!([1, 2]))).await?;
//! println!("echoed: {echoed:?}");
//!
//! client.disconnect().await?;
//! server.stop().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Wire Protocol
//!
//! Every payload is a single JSON object with `"jsonrpc": "2.0"`. Requests
//! carry `id`, `method`, and optional `params`; responses carry `id` and
//! exactly one of `result` or `error`. Batch requests are not supported;
//! notifications are never emitted, and a received id-less request is
//! answered under the id `"unknown"`.
//!
//! Framing is selected per endpoint via [`Framing`]; both peers must use
//! the same discipline. A single frame is capped at 1 MB; one oversized or
//! malformed frame is fatal to that connection, never to the server.

// Protocol layer modules
pub mod protocol;

// Transport layer modules
pub mod transport;

// Correlation layer modules
pub mod correlation;

// Endpoint layer modules
pub mod endpoint;

// Re-export commonly used types for convenience
// This allows users to import directly from the crate root
pub use protocol::{
    JsonRpcError,
    // JSON-RPC 2.0 Message Types
    JsonRpcMessage,
    JsonRpcRequest,
    JsonRpcResponse,
    // Error Types
    RpcError,
    RpcErrorKind,
    // Argument model
    RpcValue,
};

pub use transport::{CodecError, Framing, MessageCodec, TransportError};

pub use correlation::CallTracker;

pub use endpoint::{
    CallError, ClientConfig, ClientState, RequestHandler, ServerConfig, ServerState, TcpClient,
    TcpServer,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the crate version as a string
pub fn version() -> &'static str {
    VERSION
}
