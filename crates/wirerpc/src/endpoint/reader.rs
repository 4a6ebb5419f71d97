//! Connection Read Pump
//!
//! [`FrameReader`] owns the read half of a connection, the message codec,
//! and the cumulation buffer, and folds idle monitoring into the read
//! path: every socket read is armed with the configured timeout, so the
//! idle timer resets whenever inbound bytes arrive, not when a frame
//! completes. Complete frames already buffered are drained before the
//! socket is touched again.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;
use tokio_util::codec::Decoder;

const READ_CAPACITY: usize = 8 * 1024;

/// One read-side event on a connection
#[derive(Debug)]
pub enum Inbound<T> {
    /// A complete, decoded record
    Frame(T),
    /// The idle timer elapsed without inbound bytes
    ///
    /// `buffered` is true when a partial frame was sitting in the
    /// cumulation buffer, which endpoints treat as a framing violation
    /// rather than a plain timeout.
    Idle {
        /// Whether unconsumed bytes were buffered when the timer fired
        buffered: bool,
    },
    /// The peer closed the stream; a buffered partial frame has already
    /// been rejected by the codec at this point
    Eof,
}

/// Timeout-armed decoder pump over a read half
#[derive(Debug)]
pub struct FrameReader<R, C> {
    io: R,
    codec: C,
    buffer: BytesMut,
    idle_timeout: Duration,
}

impl<R, C> FrameReader<R, C>
where
    R: AsyncRead + Unpin,
    C: Decoder,
{
    /// Create a pump reading from `io` through `codec`
    pub fn new(io: R, codec: C, idle_timeout: Duration) -> Self {
        Self {
            io,
            codec,
            buffer: BytesMut::with_capacity(READ_CAPACITY),
            idle_timeout,
        }
    }

    /// Produce the next read-side event
    ///
    /// Cancellation-safe: dropping the returned future between reads
    /// loses no buffered bytes.
    pub async fn next(&mut self) -> Result<Inbound<C::Item>, C::Error> {
        loop {
            // Drain complete frames before touching the socket; a frame
            // is delivered exactly once.
            if let Some(frame) = self.codec.decode(&mut self.buffer)? {
                return Ok(Inbound::Frame(frame));
            }

            match timeout(self.idle_timeout, self.io.read_buf(&mut self.buffer)).await {
                Err(_elapsed) => {
                    return Ok(Inbound::Idle {
                        buffered: !self.buffer.is_empty(),
                    });
                }
                Ok(Ok(0)) => {
                    return match self.codec.decode_eof(&mut self.buffer)? {
                        Some(frame) => Ok(Inbound::Frame(frame)),
                        None => Ok(Inbound::Eof),
                    };
                }
                Ok(Ok(_bytes)) => continue,
                Ok(Err(error)) => return Err(error.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::defaults::MAX_PAYLOAD_BYTES;
    use crate::protocol::{JsonRpcMessage, JsonRpcRequest, RpcValue};
    use crate::transport::{CodecError, Framing, MessageCodec};

    fn request_wire(method: &str, id: &str) -> Vec<u8> {
        let mut bytes = JsonRpcRequest::new(method, RpcValue::None, id)
            .to_bytes()
            .unwrap()
            .to_vec();
        bytes.extend_from_slice(b"\r\n");
        bytes
    }

    fn reader(
        io: tokio_test::io::Mock,
        idle: Duration,
    ) -> FrameReader<tokio_test::io::Mock, MessageCodec<JsonRpcRequest>> {
        FrameReader::new(
            io,
            MessageCodec::new(Framing::Newline, MAX_PAYLOAD_BYTES),
            idle,
        )
    }

    #[tokio::test]
    async fn test_frames_split_across_reads() {
        let wire = request_wire("ping", "1");
        let (head, tail) = wire.split_at(5);
        let io = tokio_test::io::Builder::new().read(head).read(tail).build();

        let mut reader = reader(io, Duration::from_secs(1));
        match reader.next().await.unwrap() {
            Inbound::Frame(request) => assert_eq!(request.method, "ping"),
            other => panic!("expected frame, got {other:?}"),
        }
        assert!(matches!(reader.next().await.unwrap(), Inbound::Eof));
    }

    #[tokio::test]
    async fn test_two_frames_in_one_read() {
        let mut wire = request_wire("first", "1");
        wire.extend_from_slice(&request_wire("second", "2"));
        let io = tokio_test::io::Builder::new().read(&wire).build();

        let mut reader = reader(io, Duration::from_secs(1));
        for expected in ["first", "second"] {
            match reader.next().await.unwrap() {
                Inbound::Frame(request) => assert_eq!(request.method, expected),
                other => panic!("expected frame, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_idle_without_buffered_bytes() {
        let io = tokio_test::io::Builder::new()
            .wait(Duration::from_millis(100))
            .build();

        let mut reader = reader(io, Duration::from_millis(10));
        assert!(matches!(
            reader.next().await.unwrap(),
            Inbound::Idle { buffered: false }
        ));
    }

    #[tokio::test]
    async fn test_idle_with_partial_frame_reports_buffered() {
        let io = tokio_test::io::Builder::new()
            .read(b"{\"jsonrpc\"")
            .wait(Duration::from_millis(100))
            .build();

        let mut reader = reader(io, Duration::from_millis(20));
        assert!(matches!(
            reader.next().await.unwrap(),
            Inbound::Idle { buffered: true }
        ));
    }

    #[tokio::test]
    async fn test_partial_frame_at_eof_is_bad_framing() {
        let io = tokio_test::io::Builder::new().read(b"{\"jsonrpc\"").build();

        let mut reader = reader(io, Duration::from_secs(1));
        assert!(matches!(
            reader.next().await.unwrap_err(),
            CodecError::BadFraming(_)
        ));
    }
}
