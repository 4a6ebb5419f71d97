//! JsonPos Framer
//!
//! Length-prefixed wire format, byte exact:
//!
//! ```text
//! <8 hex digits: payload length> ':' <payload bytes> '\n'
//! ```
//!
//! The length is written lowercase and accepted in either case. Total frame
//! size is payload length + 10. The parsed length is cached across
//! incomplete reads so the prefix is only parsed once per frame.

// Layer 1: Standard library imports
use std::fmt::Write as _;

// Layer 2: Third-party crate imports
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

// Layer 3: Internal module imports
use crate::transport::error::CodecError;

/// Prefix: 8 hex digits plus the colon
const HEADER: usize = 9;

/// Header plus the trailing newline; smallest decodable buffer
const OVERHEAD: usize = 10;

/// `XXXXXXXX:payload\n` length-prefixed framer
#[derive(Debug)]
pub struct JsonPosFramer {
    max_payload: usize,
    /// Payload length parsed from the header, retained across
    /// incomplete reads
    pending_len: Option<usize>,
}

impl JsonPosFramer {
    /// Create a framer enforcing the given payload cap
    pub fn new(max_payload: usize) -> Self {
        Self {
            max_payload,
            pending_len: None,
        }
    }

    fn parse_header(&mut self, src: &BytesMut) -> Result<Option<usize>, CodecError> {
        if let Some(len) = self.pending_len {
            return Ok(Some(len));
        }
        if src.len() < OVERHEAD {
            return Ok(None);
        }

        let digits = std::str::from_utf8(&src[..8])
            .map_err(|_| CodecError::bad_framing("length prefix is not UTF-8"))?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CodecError::bad_framing(format!(
                "length prefix {digits:?} is not hex"
            )));
        }
        let len = usize::from_str_radix(digits, 16)
            .map_err(|_| CodecError::bad_framing(format!("length prefix {digits:?} is not hex")))?;
        if src[8] != b':' {
            return Err(CodecError::bad_framing(format!(
                "expected ':' after length prefix, found 0x{:02x}",
                src[8]
            )));
        }
        // A declared length that cannot fit the cap will inevitably
        // overflow it; fail before buffering the payload.
        if len + OVERHEAD > self.max_payload {
            return Err(CodecError::request_too_large(len, self.max_payload));
        }

        self.pending_len = Some(len);
        Ok(Some(len))
    }
}

impl Decoder for JsonPosFramer {
    type Item = BytesMut;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, CodecError> {
        if src.len() >= self.max_payload {
            return Err(CodecError::request_too_large(src.len(), self.max_payload));
        }

        let len = match self.parse_header(src)? {
            Some(len) => len,
            None => return Ok(None),
        };
        // Both the full payload and its trailing newline must have
        // arrived; anything else is an incomplete frame.
        if src.len() < len + OVERHEAD || src[HEADER + len] != b'\n' {
            return Ok(None);
        }

        self.pending_len = None;
        src.advance(HEADER);
        let frame = src.split_to(len);
        src.advance(1);
        Ok(Some(frame))
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

impl Encoder<Bytes> for JsonPosFramer {
    type Error = CodecError;

    fn encode(&mut self, payload: Bytes, dst: &mut BytesMut) -> Result<(), CodecError> {
        dst.reserve(payload.len() + OVERHEAD);
        let mut header = String::with_capacity(HEADER);
        // Infallible: writing into a String cannot error.
        let _ = write!(header, "{:08x}:", payload.len());
        dst.put_slice(header.as_bytes());
        dst.put(payload);
        dst.put_u8(b'\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_golden_frame() {
        // A 7-byte payload frames as exactly `00000007:{"a":1}\n`.
        let mut framer = JsonPosFramer::new(1024);
        let mut dst = BytesMut::new();
        framer
            .encode(Bytes::from_static(b"{\"a\":1}"), &mut dst)
            .unwrap();
        assert_eq!(&dst[..], b"00000007:{\"a\":1}\n");

        let frame = framer.decode(&mut dst).unwrap().unwrap();
        assert_eq!(&frame[..], b"{\"a\":1}");
        assert!(dst.is_empty());
    }

    #[test]
    fn test_uppercase_hex_accepted_on_receipt() {
        let mut framer = JsonPosFramer::new(1024);
        let mut buf = BytesMut::from(&b"0000000A:0123456789\n"[..]);

        let frame = framer.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&frame[..], b"0123456789");
    }

    #[test]
    fn test_needs_ten_bytes_before_parsing() {
        let mut framer = JsonPosFramer::new(1024);
        let mut buf = BytesMut::from(&b"0000000"[..]);

        assert!(framer.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_non_hex_prefix_is_bad_framing() {
        let mut framer = JsonPosFramer::new(1024);
        let mut buf = BytesMut::from(&b"0000zz07:{\"a\":1}\n"[..]);

        let err = framer.decode(&mut buf).unwrap_err();
        assert!(matches!(err, CodecError::BadFraming(_)));
    }

    #[test]
    fn test_missing_colon_is_bad_framing() {
        let mut framer = JsonPosFramer::new(1024);
        let mut buf = BytesMut::from(&b"00000007;{\"a\":1}\n"[..]);

        let err = framer.decode(&mut buf).unwrap_err();
        assert!(matches!(err, CodecError::BadFraming(_)));
    }

    #[test]
    fn test_incomplete_payload_waits() {
        let mut framer = JsonPosFramer::new(1024);
        let mut buf = BytesMut::from(&b"00000007:{\"a\""[..]);

        assert!(framer.decode(&mut buf).unwrap().is_none());
        // Length is cached; completing the frame decodes it.
        assert_eq!(framer.pending_len, Some(7));

        buf.extend_from_slice(b":1}\n");
        let frame = framer.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&frame[..], b"{\"a\":1}");
        assert_eq!(framer.pending_len, None);
    }

    #[test]
    fn test_wrong_trailer_byte_waits() {
        // The final byte must be LF; until it is, the frame is incomplete.
        let mut framer = JsonPosFramer::new(1024);
        let mut buf = BytesMut::from(&b"00000007:{\"a\":1}X"[..]);

        assert!(framer.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_declared_length_beyond_cap_fails_fast() {
        let mut framer = JsonPosFramer::new(1024);
        let mut buf = BytesMut::from(&b"00ffffff:{\"a\""[..]);

        let err = framer.decode(&mut buf).unwrap_err();
        assert!(matches!(err, CodecError::RequestTooLarge { .. }));
    }

    #[test]
    fn test_oversized_buffer_is_fatal() {
        let mut framer = JsonPosFramer::new(32);
        let mut buf = BytesMut::from(&[b'x'; 32][..]);

        let err = framer.decode(&mut buf).unwrap_err();
        assert!(matches!(err, CodecError::RequestTooLarge { .. }));
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut framer = JsonPosFramer::new(1024);
        let mut buf = BytesMut::new();
        framer.encode(Bytes::from_static(b"one"), &mut buf).unwrap();
        framer.encode(Bytes::from_static(b"three"), &mut buf).unwrap();

        let first = framer.decode(&mut buf).unwrap().unwrap();
        let second = framer.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&first[..], b"one");
        assert_eq!(&second[..], b"three");
        assert!(buf.is_empty());
    }
}
