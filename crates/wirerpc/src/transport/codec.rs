//! Message Codec
//!
//! Bridges byte frames and typed wire records. Inbound frames are decoded
//! as UTF-8 JSON into the configured record type (`JsonRpcRequest` on the
//! server, `JsonRpcResponse` on the client) and validated; outbound records
//! are encoded to compact JSON and handed to the active framer. Once the
//! framer has consumed a frame's bytes, a JSON failure no longer poisons
//! the stream; the connection could recover at the next frame boundary,
//! and whether it does is endpoint policy.

// Layer 1: Standard library imports
use std::marker::PhantomData;

// Layer 2: Third-party crate imports
use bytes::{Bytes, BytesMut};
use serde::de::Error as _;
use tokio_util::codec::{Decoder, Encoder};

// Layer 3: Internal module imports
use crate::protocol::JsonRpcMessage;
use crate::transport::error::CodecError;
use crate::transport::framing::{FrameCodec, Framing};

/// Typed record codec over a [`FrameCodec`]
#[derive(Debug)]
pub struct MessageCodec<T> {
    frames: FrameCodec,
    _record: PhantomData<fn() -> T>,
}

impl<T: JsonRpcMessage> MessageCodec<T> {
    /// Create a codec for the given framing discipline and payload cap
    pub fn new(framing: Framing, max_payload: usize) -> Self {
        Self {
            frames: FrameCodec::new(framing, max_payload),
            _record: PhantomData,
        }
    }

    fn decode_frame(frame: &BytesMut) -> Result<T, CodecError> {
        let record = T::from_json_bytes(frame)?;
        // A structurally invalid record is reported like undecodable
        // JSON; both map to a parse error on the wire.
        record.validate().map_err(serde_json::Error::custom)?;
        Ok(record)
    }
}

impl<T: JsonRpcMessage> Decoder for MessageCodec<T> {
    type Item = T;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<T>, CodecError> {
        match self.frames.decode(src)? {
            Some(frame) => Ok(Some(Self::decode_frame(&frame)?)),
            None => Ok(None),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<T>, CodecError> {
        match self.frames.decode_eof(src)? {
            Some(frame) => Ok(Some(Self::decode_frame(&frame)?)),
            None => Ok(None),
        }
    }
}

impl<'a, T: JsonRpcMessage> Encoder<&'a T> for MessageCodec<T> {
    type Error = CodecError;

    fn encode(&mut self, record: &'a T, dst: &mut BytesMut) -> Result<(), CodecError> {
        let payload: Bytes = record.to_bytes()?;
        self.frames.encode(payload, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::defaults::MAX_PAYLOAD_BYTES;
    use crate::protocol::{JsonRpcRequest, JsonRpcResponse, RpcValue};
    use serde_json::json;

    #[test]
    fn test_request_round_trip_through_newline_framing() {
        let mut codec: MessageCodec<JsonRpcRequest> =
            MessageCodec::new(Framing::Newline, MAX_PAYLOAD_BYTES);
        let request = JsonRpcRequest::new("add", RpcValue::from(json!([1, 2])), "1");

        let mut wire = BytesMut::new();
        codec.encode(&request, &mut wire).unwrap();
        assert!(wire.ends_with(b"\r\n"));

        let decoded = codec.decode(&mut wire).unwrap().unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_bad_json_in_complete_frame() {
        let mut codec: MessageCodec<JsonRpcRequest> =
            MessageCodec::new(Framing::Newline, MAX_PAYLOAD_BYTES);
        let mut wire = BytesMut::from(&b"notjson\r\n"[..]);

        let err = codec.decode(&mut wire).unwrap_err();
        assert!(matches!(err, CodecError::BadJson(_)));
        // The frame's bytes were consumed; the stream can continue.
        assert!(wire.is_empty());
    }

    #[test]
    fn test_wrong_version_rejected_on_receipt() {
        let mut codec: MessageCodec<JsonRpcResponse> =
            MessageCodec::new(Framing::Newline, MAX_PAYLOAD_BYTES);
        let mut wire = BytesMut::from(&b"{\"jsonrpc\":\"1.1\",\"result\":1,\"id\":\"1\"}\r\n"[..]);

        assert!(codec.decode(&mut wire).is_err());
    }

    #[test]
    fn test_incomplete_frame_decodes_nothing() {
        let mut codec: MessageCodec<JsonRpcRequest> =
            MessageCodec::new(Framing::JsonPos, MAX_PAYLOAD_BYTES);
        let mut wire = BytesMut::from(&b"0000002a:{\"jsonrpc\""[..]);

        assert!(codec.decode(&mut wire).unwrap().is_none());
    }

    #[test]
    fn test_typed_decode_over_brute_framing() {
        let mut codec: MessageCodec<JsonRpcRequest> =
            MessageCodec::new(Framing::Brute, MAX_PAYLOAD_BYTES);
        let mut wire =
            BytesMut::from(&br#"{"jsonrpc":"2.0","id":"1","method":"m","params":{}}"#[..]);

        let decoded = codec.decode(&mut wire).unwrap().unwrap();
        assert_eq!(decoded.method, "m");
        assert_eq!(decoded.id, "1");
    }
}
