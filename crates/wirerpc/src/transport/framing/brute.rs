//! Brute-Force Framer
//!
//! No delimiter at all; for peers that send one JSON document per write
//! with no trailer (lightsd-style). The decoder waits until the buffer
//! ends in `}` and then attempts a full JSON parse of everything buffered.
//! A parse failure means the document is still incomplete (a `}` may be
//! sitting inside a string literal), so more bytes are awaited.
//!
//! The payload cap is checked before the parse attempt, so a huge
//! malformed blob with a trailing `}` still fails with `RequestTooLarge`
//! instead of buffering forever.

// Layer 2: Third-party crate imports
use bytes::{BufMut, Bytes, BytesMut};
use serde_json::Value;
use tokio_util::codec::{Decoder, Encoder};

// Layer 3: Internal module imports
use crate::transport::error::CodecError;

/// Whole-buffer JSON boundary detection framer
#[derive(Debug)]
pub struct BruteForceFramer {
    max_payload: usize,
}

impl BruteForceFramer {
    /// Create a framer enforcing the given payload cap
    pub fn new(max_payload: usize) -> Self {
        Self { max_payload }
    }
}

impl Decoder for BruteForceFramer {
    type Item = BytesMut;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, CodecError> {
        // Size check takes precedence over the parse attempt.
        if src.len() >= self.max_payload {
            return Err(CodecError::request_too_large(src.len(), self.max_payload));
        }
        if src.last() != Some(&b'}') {
            return Ok(None);
        }

        // Boundary detection only; typed decoding happens one layer up.
        match serde_json::from_slice::<Value>(src) {
            Ok(_) => {
                let len = src.len();
                Ok(Some(src.split_to(len)))
            }
            // More bytes may complete the document.
            Err(_) => Ok(None),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, CodecError> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => Err(CodecError::bad_framing(
                "stream ended inside an undecodable document",
            )),
        }
    }
}

impl Encoder<Bytes> for BruteForceFramer {
    type Error = CodecError;

    fn encode(&mut self, payload: Bytes, dst: &mut BytesMut) -> Result<(), CodecError> {
        dst.reserve(payload.len());
        dst.put(payload);
        Ok(())
    }
}
