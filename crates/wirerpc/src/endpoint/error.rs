//! Endpoint Error Types
//!
//! [`CallError`] is what [`crate::endpoint::TcpClient::call`] returns:
//! either the peer answered with an error (`Rpc`), or the connection
//! failed before an answer arrived (`Transport`).

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::protocol::RpcError;
use crate::transport::TransportError;

/// Failure of a single call
#[derive(Debug, Error)]
pub enum CallError {
    /// The peer answered, and the answer was an error
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The connection failed before the answer arrived
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl CallError {
    /// The RPC error, when the peer answered with one
    pub fn as_rpc(&self) -> Option<&RpcError> {
        match self {
            CallError::Rpc(err) => Some(err),
            CallError::Transport(_) => None,
        }
    }

    /// True when the call failed on the transport rather than at the peer
    pub fn is_transport(&self) -> bool {
        matches!(self, CallError::Transport(_))
    }
}
