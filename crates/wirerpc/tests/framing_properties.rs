//! Property tests: framer laws under arbitrary byte chunking.

use bytes::{Bytes, BytesMut};
use proptest::prelude::*;
use tokio_util::codec::{Decoder, Encoder};

use wirerpc::transport::{CodecError, FrameCodec, Framing};

const CAP: usize = 1_000_000;

/// Encode every payload, concatenate the wire bytes, re-feed them in
/// `chunk`-sized pieces, and require the original frames back in order.
fn assert_chunked_round_trip(framing: Framing, payloads: &[Vec<u8>], chunk: usize) {
    let mut encoder = FrameCodec::new(framing, CAP);
    let mut wire = BytesMut::new();
    for payload in payloads {
        encoder
            .encode(Bytes::from(payload.clone()), &mut wire)
            .unwrap();
    }

    let mut decoder = FrameCodec::new(framing, CAP);
    let mut buffer = BytesMut::new();
    let mut decoded: Vec<Vec<u8>> = Vec::new();
    for piece in wire.chunks(chunk) {
        buffer.extend_from_slice(piece);
        while let Some(frame) = decoder.decode(&mut buffer).unwrap() {
            decoded.push(frame.to_vec());
        }
    }

    assert_eq!(decoded, payloads.to_vec());
    assert!(buffer.is_empty(), "decoder left bytes unconsumed");
}

/// Printable ASCII payloads; the newline framer's delimiter bytes may not
/// occur inside a payload.
fn newline_safe_payloads() -> impl Strategy<Value = Vec<Vec<u8>>> {
    proptest::collection::vec(
        proptest::collection::vec(0x20u8..0x7f, 1..200),
        1..8,
    )
}

/// Arbitrary payloads; the length prefix makes content irrelevant.
fn arbitrary_payloads() -> impl Strategy<Value = Vec<Vec<u8>>> {
    proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..200), 1..8)
}

proptest! {
    #[test]
    fn newline_frames_survive_any_chunking(
        payloads in newline_safe_payloads(),
        chunk in 1usize..16,
    ) {
        assert_chunked_round_trip(Framing::Newline, &payloads, chunk);
    }

    #[test]
    fn jsonpos_frames_survive_any_chunking(
        payloads in arbitrary_payloads(),
        chunk in 1usize..16,
    ) {
        assert_chunked_round_trip(Framing::JsonPos, &payloads, chunk);
    }

    #[test]
    fn brute_force_emits_exactly_once_at_document_end(
        entries in proptest::collection::btree_map("[a-z]{1,8}", any::<i64>(), 1..6),
        chunk in 1usize..16,
    ) {
        // No proper prefix of a JSON object is itself a complete JSON
        // object, so the frame must appear exactly when the last byte
        // lands and never before.
        let doc = serde_json::to_vec(&entries).unwrap();

        let mut decoder = FrameCodec::new(Framing::Brute, CAP);
        let mut buffer = BytesMut::new();
        let mut frames = 0usize;
        for piece in doc.chunks(chunk) {
            buffer.extend_from_slice(piece);
            while let Some(frame) = decoder.decode(&mut buffer).unwrap() {
                prop_assert_eq!(&frame[..], &doc[..]);
                frames += 1;
            }
        }

        prop_assert_eq!(frames, 1);
        prop_assert!(buffer.is_empty());
    }

    #[test]
    fn undelimited_bytes_at_cap_raise_request_too_large(
        chunk in 1usize..4096,
    ) {
        // Bytes that never complete a frame must fail exactly once, by
        // size, no matter how they are chunked.
        let cap = 8 * 1024;
        let mut decoder = FrameCodec::new(Framing::Newline, cap);
        let mut buffer = BytesMut::new();
        let blob = vec![b'x'; cap * 2];

        let mut failure = None;
        'feed: for piece in blob.chunks(chunk) {
            buffer.extend_from_slice(piece);
            loop {
                match decoder.decode(&mut buffer) {
                    Ok(Some(_)) => prop_assert!(false, "no frame should ever complete"),
                    Ok(None) => continue 'feed,
                    Err(error) => {
                        failure = Some(error);
                        break 'feed;
                    }
                }
            }
        }

        prop_assert!(
            matches!(failure, Some(CodecError::RequestTooLarge { .. })),
            "expected RequestTooLarge error"
        );
        prop_assert!(buffer.len() <= cap + chunk);
    }
}
