//! Newline Framer
//!
//! Frames are delimited by the two-byte sequence `\r\n`. The delimiter is
//! consumed but never part of the emitted frame.

// Layer 2: Third-party crate imports
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

// Layer 3: Internal module imports
use crate::transport::error::CodecError;

const CR: u8 = 0x0D;
const LF: u8 = 0x0A;

/// Minimum viable buffer: one payload byte plus the delimiter
const MIN_FRAME: usize = 3;

/// `\r\n`-delimited framer
#[derive(Debug)]
pub struct NewlineFramer {
    max_payload: usize,
}

impl NewlineFramer {
    /// Create a framer enforcing the given payload cap
    pub fn new(max_payload: usize) -> Self {
        Self { max_payload }
    }
}

impl Decoder for NewlineFramer {
    type Item = BytesMut;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, CodecError> {
        // Size check comes before any scanning.
        if src.len() >= self.max_payload {
            return Err(CodecError::request_too_large(src.len(), self.max_payload));
        }
        if src.len() < MIN_FRAME {
            return Ok(None);
        }

        // Scan for adjacent CR LF at i-1, i.
        let position = src
            .windows(2)
            .position(|pair| pair[0] == CR && pair[1] == LF);
        match position {
            Some(at) => {
                let frame = src.split_to(at);
                src.advance(2);
                Ok(Some(frame))
            }
            None => Ok(None),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, CodecError> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => Err(CodecError::bad_framing(
                "stream ended inside an unterminated frame",
            )),
        }
    }
}

impl Encoder<Bytes> for NewlineFramer {
    type Error = CodecError;

    fn encode(&mut self, payload: Bytes, dst: &mut BytesMut) -> Result<(), CodecError> {
        dst.reserve(payload.len() + 2);
        dst.put(payload);
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
