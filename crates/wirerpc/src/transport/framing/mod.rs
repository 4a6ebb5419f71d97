//! Wire Framing
//!
//! Three interchangeable framers split the inbound byte stream into whole
//! JSON frames and add framing on the outbound side:
//!
//! - [`NewlineFramer`]: `\r\n`-delimited frames
//! - [`JsonPosFramer`]: 8-hex-digit length prefix, colon, payload, newline
//! - [`BruteForceFramer`]: whole-buffer JSON boundary detection, no trailer
//!
//! All three share a contract: decoding is incremental over a cumulation
//! buffer that retains unconsumed bytes across reads, each frame is
//! delivered exactly once, and a buffer reaching the payload cap without a
//! complete frame is fatal with `RequestTooLarge`. A partial frame still
//! buffered when the connection goes idle or closes is a framing error.

// Layer 1: Standard library imports
use std::fmt;
use std::str::FromStr;

// Layer 2: Third-party crate imports
use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tokio_util::codec::{Decoder, Encoder};

// Layer 3: Internal module imports
use crate::transport::error::CodecError;

mod brute;
mod jsonpos;
mod newline;

pub use brute::BruteForceFramer;
pub use jsonpos::JsonPosFramer;
pub use newline::NewlineFramer;

/// Framing discipline selector
///
/// Chosen per endpoint via configuration; both peers must agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// `\r\n`-delimited frames
    Newline,
    /// Length-prefixed `XXXXXXXX:payload\n` frames
    JsonPos,
    /// One JSON document per write, no trailer
    Brute,
}

impl Default for Framing {
    fn default() -> Self {
        Framing::Newline
    }
}

impl FromStr for Framing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newline" => Ok(Framing::Newline),
            "jsonpos" => Ok(Framing::JsonPos),
            "brute" => Ok(Framing::Brute),
            other => Err(format!(
                "unknown framing {other:?}, expected newline | jsonpos | brute"
            )),
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Framing::Newline => "newline",
            Framing::JsonPos => "jsonpos",
            Framing::Brute => "brute",
        };
        f.write_str(name)
    }
}

/// The active framer of a connection
///
/// Dispatches `Decoder`/`Encoder` calls to the framer selected by
/// [`Framing`]; frames travel as raw bytes, typed decoding happens in
/// [`crate::transport::MessageCodec`].
#[derive(Debug)]
pub enum FrameCodec {
    /// `\r\n`-delimited framing
    Newline(NewlineFramer),
    /// Length-prefixed framing
    JsonPos(JsonPosFramer),
    /// Whole-buffer boundary detection
    Brute(BruteForceFramer),
}

impl FrameCodec {
    /// Instantiate the framer for the given discipline and payload cap
    pub fn new(framing: Framing, max_payload: usize) -> Self {
        match framing {
            Framing::Newline => FrameCodec::Newline(NewlineFramer::new(max_payload)),
            Framing::JsonPos => FrameCodec::JsonPos(JsonPosFramer::new(max_payload)),
            Framing::Brute => FrameCodec::Brute(BruteForceFramer::new(max_payload)),
        }
    }
}

impl Decoder for FrameCodec {
    type Item = BytesMut;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, CodecError> {
        match self {
            FrameCodec::Newline(framer) => framer.decode(src),
            FrameCodec::JsonPos(framer) => framer.decode(src),
            FrameCodec::Brute(framer) => framer.decode(src),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, CodecError> {
        match self {
            FrameCodec::Newline(framer) => framer.decode_eof(src),
            FrameCodec::JsonPos(framer) => framer.decode_eof(src),
            FrameCodec::Brute(framer) => framer.decode_eof(src),
        }
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = CodecError;

    fn encode(&mut self, payload: Bytes, dst: &mut BytesMut) -> Result<(), CodecError> {
        match self {
            FrameCodec::Newline(framer) => framer.encode(payload, dst),
            FrameCodec::JsonPos(framer) => framer.encode(payload, dst),
            FrameCodec::Brute(framer) => framer.encode(payload, dst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::defaults::MAX_PAYLOAD_BYTES;

    #[test]
    fn test_framing_from_str() {
        assert_eq!("newline".parse::<Framing>().unwrap(), Framing::Newline);
        assert_eq!("jsonpos".parse::<Framing>().unwrap(), Framing::JsonPos);
        assert_eq!("brute".parse::<Framing>().unwrap(), Framing::Brute);
        assert!("http".parse::<Framing>().is_err());
    }

    #[test]
    fn test_framing_display_round_trip() {
        for framing in [Framing::Newline, Framing::JsonPos, Framing::Brute] {
            assert_eq!(framing.to_string().parse::<Framing>().unwrap(), framing);
        }
    }

    #[test]
    fn test_codec_dispatches_to_selected_framer() {
        let mut codec = FrameCodec::new(Framing::JsonPos, MAX_PAYLOAD_BYTES);
        let mut buf = BytesMut::new();

        codec.encode(Bytes::from_static(b"{}"), &mut buf).unwrap();
        assert_eq!(&buf[..], b"00000002:{}\n");

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&frame[..], b"{}");
    }
}
