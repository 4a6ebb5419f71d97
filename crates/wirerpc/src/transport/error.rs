//! Transport Error Types
//!
//! Two layers of failure are distinguished: [`CodecError`] for anything the
//! framer/codec stack detects while turning bytes into records, and
//! [`TransportError`] for connection-level failures surfaced to endpoint
//! callers. A codec error on an established connection travels inside
//! `TransportError::Codec`.

// Layer 1: Standard library imports
use std::io;

/// Errors raised by the framers and the message codec
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The byte stream violates the active framing discipline
    #[error("bad framing: {0}")]
    BadFraming(String),

    /// A complete frame was not valid JSON for the expected record
    #[error("invalid JSON payload: {0}")]
    BadJson(#[from] serde_json::Error),

    /// A single frame exceeded the payload cap; fatal to the connection
    #[error("frame of {size} bytes exceeds maximum payload of {max} bytes")]
    RequestTooLarge { size: usize, max: usize },

    /// Buffered inbound bytes never became JSON
    #[error("inbound bytes are not JSON")]
    NotJson,

    /// I/O failure while reading or writing frames
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CodecError {
    /// Create a framing violation with context
    pub fn bad_framing(message: impl Into<String>) -> Self {
        Self::BadFraming(message.into())
    }

    /// Create a payload-cap violation
    pub fn request_too_large(size: usize, max: usize) -> Self {
        Self::RequestTooLarge { size, max }
    }
}

/// Connection-level errors surfaced to endpoint callers
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The endpoint is not in a state that allows the operation
    #[error("endpoint is not ready")]
    NotReady,

    /// Binding the listener failed
    #[error("cannot bind {addr}: {source}")]
    CantBind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The inbound-read idle timer elapsed
    #[error("connection timed out after {duration_ms}ms without inbound bytes")]
    Timeout { duration_ms: u64 },

    /// The peer closed or reset the connection unexpectedly
    #[error("connection reset by peer")]
    ConnectionReset,

    /// The connection was closed locally
    #[error("connection is closed")]
    Closed,

    /// A framing or JSON decoding failure on the connection
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// I/O failure on the socket
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport-specific error
    #[error("transport error: {details}")]
    Other { details: String },
}

impl TransportError {
    /// Create a bind failure for the given address
    pub fn cant_bind(addr: impl Into<String>, source: io::Error) -> Self {
        Self::CantBind {
            addr: addr.into(),
            source,
        }
    }

    /// Create an idle-timeout error
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a transport-specific error with details
    pub fn other(details: impl Into<String>) -> Self {
        Self::Other {
            details: details.into(),
        }
    }

    /// True when this error came out of the codec stack
    pub fn is_codec(&self) -> bool {
        matches!(self, TransportError::Codec(_))
    }
}
