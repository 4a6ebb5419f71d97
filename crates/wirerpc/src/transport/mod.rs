//! Transport Layer - Framing and Codec Stack
//!
//! Bytes flow upward through the framer (splitting the stream into whole
//! JSON frames) into the message codec (typed records); outbound records
//! take the reverse path. The framers are stream decoders over a cumulation
//! buffer; see [`framing`] for the three disciplines.

pub mod codec;
pub mod error;
pub mod framing;

pub use codec::MessageCodec;
pub use error::{CodecError, TransportError};
pub use framing::{BruteForceFramer, FrameCodec, Framing, JsonPosFramer, NewlineFramer};
