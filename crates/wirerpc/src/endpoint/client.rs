//! TCP Client Endpoint
//!
//! Submits requests, correlates inbound responses against the pending-call
//! table by id, and converts each response into a user-facing result.
//! `call` never blocks on submission; it resolves when the response
//! arrives or the connection fails.
//!
//! The client is tolerant of a single malformed response frame (it may be
//! a transient server bug): the oldest pending call receives a synthetic
//! parse-error response and the connection stays up. Every other pipeline
//! failure is fatal to the connection and drains all pending calls.

// Layer 1: Standard library imports
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

// Layer 2: Third-party crate imports
use futures::SinkExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::codec::FramedWrite;
use tracing::{debug, error, warn};
use uuid::Uuid;

// Layer 3: Internal module imports
use crate::correlation::{CallTracker, PendingCall};
use crate::endpoint::config::ClientConfig;
use crate::endpoint::error::CallError;
use crate::endpoint::reader::{FrameReader, Inbound};
use crate::protocol::constants::defaults::OUTBOUND_QUEUE;
use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcValue};
use crate::transport::{CodecError, MessageCodec, TransportError};

/// Client lifecycle; advances monotonically, `Disconnected` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Constructed, not yet connected
    Initializing,
    /// Connected and able to submit calls
    Connected,
    /// Terminal
    Disconnected,
}

/// A JSON-RPC 2.0 client over TCP
///
/// # Examples
///
/// ```rust,no_run
/// use wirerpc::endpoint::{ClientConfig, TcpClient};
/// use wirerpc::protocol::RpcValue;
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut client = TcpClient::new(ClientConfig::default());
/// client.connect("127.0.0.1:8000".parse().unwrap()).await?;
///
/// let sum = client.call("add", RpcValue::from(json!([1, 2]))).await?;
/// assert_eq!(sum, RpcValue::Integer(3));
///
/// client.disconnect().await?;
/// # Ok(())
/// # }
/// ```
pub struct TcpClient {
    config: ClientConfig,
    state: Mutex<ClientState>,
    tracker: Arc<CallTracker>,
    outbound: Option<mpsc::Sender<JsonRpcRequest>>,
    connection_task: Option<JoinHandle<()>>,
}

impl TcpClient {
    /// Create an unconnected client
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            state: Mutex::new(ClientState::Initializing),
            tracker: Arc::new(CallTracker::new()),
            outbound: None,
            connection_task: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ClientState {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, next: ClientState) {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = next;
    }

    /// Connect to the peer
    ///
    /// Resolves once the TCP connect completes. Fails with `NotReady`
    /// unless the client is freshly constructed.
    pub async fn connect(&mut self, addr: SocketAddr) -> Result<(), TransportError> {
        if self.state() != ClientState::Initializing {
            return Err(TransportError::NotReady);
        }

        // A failed connect leaves the client terminal.
        let stream = match TcpStream::connect(addr).await {
            Ok(stream) => stream,
            Err(error) => {
                self.set_state(ClientState::Disconnected);
                return Err(error.into());
            }
        };
        if let Err(error) = stream.set_nodelay(true) {
            warn!(%addr, %error, "failed to set TCP_NODELAY");
        }
        let (read_half, write_half) = stream.into_split();

        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE);
        self.connection_task = Some(tokio::spawn(run_connection(
            read_half,
            write_half,
            self.config.clone(),
            Arc::clone(&self.tracker),
            outbound_rx,
            addr,
        )));
        self.outbound = Some(outbound_tx);
        self.set_state(ClientState::Connected);

        debug!(%addr, framing = %self.config.framing, "client connected");
        Ok(())
    }

    /// Invoke `method` on the peer and await its response
    ///
    /// Submission never blocks beyond the hop onto the connection task;
    /// the returned future resolves when the response arrives, the idle
    /// timer fires, or the connection fails. Each call gets a fresh UUID
    /// id, unique within the connection's pending window.
    pub async fn call(&self, method: impl Into<String>, params: RpcValue) -> Result<RpcValue, CallError> {
        let outbound = {
            if self.state() != ClientState::Connected {
                return Err(TransportError::NotReady.into());
            }
            match &self.outbound {
                Some(sender) => sender.clone(),
                None => return Err(TransportError::NotReady.into()),
            }
        };

        let id = Uuid::new_v4().to_string();
        let (sender, receiver) = oneshot::channel();
        if self.tracker.register(&*id, PendingCall::new(sender)).is_err() {
            return Err(TransportError::other("duplicate request id").into());
        }

        let request = JsonRpcRequest::new(method, params, &*id);
        if outbound.send(request).await.is_err() {
            // The connection task is gone; nobody will resolve this call.
            self.tracker.fail(&id, TransportError::ConnectionReset);
            return Err(TransportError::ConnectionReset.into());
        }

        match receiver.await {
            Ok(Ok(response)) => response.into_result().map_err(CallError::from),
            Ok(Err(transport)) => Err(transport.into()),
            Err(_recv) => Err(TransportError::ConnectionReset.into()),
        }
    }

    /// Close the connection
    ///
    /// Resolves once the socket's close is observed. Pending calls fail
    /// with `Closed`. Must be called exactly once.
    pub async fn disconnect(&mut self) -> Result<(), TransportError> {
        {
            let mut state = self
                .state
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if *state != ClientState::Connected {
                return Err(TransportError::NotReady);
            }
            *state = ClientState::Disconnected;
        }

        // Closing the outbound channel is the shutdown signal for the
        // connection task.
        self.outbound.take();
        if let Some(task) = self.connection_task.take() {
            let _ = task.await;
        }
        debug!("client disconnected");
        Ok(())
    }
}

impl Drop for TcpClient {
    fn drop(&mut self) {
        let state = self.state();
        if !matches!(state, ClientState::Initializing | ClientState::Disconnected) {
            error!(?state, "TcpClient dropped without disconnect()");
            debug_assert!(false, "TcpClient dropped without disconnect()");
        }
    }
}

/// How the connection loop ended
enum Close {
    /// `disconnect` closed the outbound channel
    Local,
    /// The peer or the pipeline ended the connection
    Remote,
}

async fn run_connection(
    read_half: OwnedReadHalf,
    write_half: OwnedWriteHalf,
    config: ClientConfig,
    tracker: Arc<CallTracker>,
    mut outbound_rx: mpsc::Receiver<JsonRpcRequest>,
    peer: SocketAddr,
) {
    let mut reader = FrameReader::new(
        read_half,
        MessageCodec::<JsonRpcResponse>::new(config.framing, config.max_payload),
        config.timeout,
    );
    let mut sink = FramedWrite::new(
        write_half,
        MessageCodec::<JsonRpcRequest>::new(config.framing, config.max_payload),
    );

    let close = loop {
        tokio::select! {
            submitted = outbound_rx.recv() => match submitted {
                Some(request) => {
                    if let Err(error) = sink.send(&request).await {
                        // A failed write fails that call's promise; the
                        // connection is not worth keeping after it.
                        let error = TransportError::from(error);
                        warn!(%peer, %error, id = %request.id, "failed to write request");
                        tracker.fail(&request.id, error);
                        break Close::Remote;
                    }
                }
                None => break Close::Local,
            },
            inbound = reader.next() => match inbound {
                Ok(Inbound::Frame(response)) => {
                    let id = response.id.clone();
                    if !tracker.complete(&id, response) {
                        // Id-keyed matching: a response nobody asked for
                        // is dropped, not misdelivered.
                        warn!(%peer, %id, "response with no pending call");
                    }
                }
                Err(error @ (CodecError::BadJson(_) | CodecError::NotJson)) => {
                    // A malformed response frame fails the oldest call
                    // with a synthetic parse-error response, so the
                    // caller can still correlate it; the connection
                    // stays up.
                    warn!(%peer, %error, "malformed response frame");
                    if let Some((id, call)) = tracker.pop_head() {
                        let response = JsonRpcResponse::failure(
                            JsonRpcError::parse_error(error.to_string()),
                            id,
                        );
                        call.resolve(Ok(response));
                    }
                }
                Ok(Inbound::Idle { buffered }) => {
                    let error = if buffered {
                        TransportError::from(CodecError::bad_framing(
                            "idle timeout with a partial frame buffered",
                        ))
                    } else {
                        TransportError::timeout(config.timeout.as_millis() as u64)
                    };
                    warn!(%peer, %error, "closing connection");
                    if let Some((id, call)) = tracker.pop_head() {
                        debug!(%id, "failing oldest pending call");
                        call.resolve(Err(error));
                    }
                    break Close::Remote;
                }
                Ok(Inbound::Eof) => {
                    debug!(%peer, "connection closed by peer");
                    break Close::Remote;
                }
                Err(error) => {
                    let error = TransportError::from(error);
                    warn!(%peer, %error, "closing connection");
                    if let Some((id, call)) = tracker.pop_head() {
                        debug!(%id, "failing oldest pending call");
                        call.resolve(Err(error));
                    }
                    break Close::Remote;
                }
            },
        }
    };

    // Refuse new submissions first, so a call racing this teardown fails
    // its send instead of parking a promise nobody will resolve; then
    // fail requests that were queued but never written, and drain the
    // pending table one-by-one in submission order.
    outbound_rx.close();
    let error: fn() -> TransportError = match close {
        Close::Local => || TransportError::Closed,
        Close::Remote => || TransportError::ConnectionReset,
    };
    while let Ok(request) = outbound_rx.try_recv() {
        tracker.fail(&request.id, error());
    }
    tracker.drain(error);
}
