//! Protocol Layer - JSON-RPC 2.0 Wire Records
//!
//! Typed request/response records, the [`RpcValue`] argument model, the
//! client-facing error taxonomy, and the wire constants. Everything in this
//! module is transport-agnostic; framing and sockets live in
//! [`crate::transport`] and [`crate::endpoint`].

pub mod constants;
pub mod errors;
pub mod message;
pub mod value;

// Re-export the protocol surface at the module root, mirroring how
// downstream code imports it.
pub use constants::{JSONRPC_VERSION, UNKNOWN_ID};
pub use errors::{RpcError, RpcErrorKind};
pub use message::{JsonRpcError, JsonRpcMessage, JsonRpcRequest, JsonRpcResponse};
pub use value::RpcValue;
