//! TCP Server Endpoint
//!
//! Accepts connections, decodes inbound requests through the configured
//! framing, dispatches them to the user handler, and writes the replies
//! back. Each connection runs on its own task; requests are dispatched in
//! arrival order but handlers may complete, and therefore reply, in any
//! order.
//!
//! The server is defensive against peers: one bad frame kills that
//! connection (after a best-effort error response), never the server.

// Layer 1: Standard library imports
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

// Layer 2: Third-party crate imports
use futures::SinkExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::codec::FramedWrite;
use tracing::{debug, error, warn};

// Layer 3: Internal module imports
use crate::endpoint::config::ServerConfig;
use crate::endpoint::handler::RequestHandler;
use crate::endpoint::reader::{FrameReader, Inbound};
use crate::protocol::constants::defaults::OUTBOUND_QUEUE;
use crate::protocol::constants::UNKNOWN_ID;
use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::transport::{CodecError, MessageCodec, TransportError};

/// Server lifecycle; advances monotonically, `Stopped` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Constructed, not yet bound
    Initializing,
    /// Binding the listener
    Starting,
    /// Accepting connections
    Started,
    /// Shutdown signalled, waiting for the listener to close
    Stopping,
    /// Terminal
    Stopped,
}

/// A JSON-RPC 2.0 server over TCP
///
/// # Examples
///
/// ```rust,no_run
/// use wirerpc::endpoint::{ServerConfig, TcpServer};
/// use wirerpc::protocol::{RpcError, RpcValue};
///
/// # async fn example() -> Result<(), wirerpc::transport::TransportError> {
/// let mut server = TcpServer::new(ServerConfig::default(), |method: String, params: RpcValue| async move {
///     match method.as_str() {
///         "echo" => Ok(params),
///         other => Err(RpcError::invalid_method(other)),
///     }
/// });
///
/// let addr = server.start("127.0.0.1:8000".parse().unwrap()).await?;
/// println!("listening on {addr}");
/// // ... later
/// server.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct TcpServer {
    config: ServerConfig,
    handler: Arc<dyn RequestHandler>,
    // start/stop may be invoked from arbitrary threads
    state: Mutex<ServerState>,
    shutdown: Option<watch::Sender<bool>>,
    accept_task: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl TcpServer {
    /// Create a server dispatching to `handler`
    pub fn new(config: ServerConfig, handler: impl RequestHandler + 'static) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
            state: Mutex::new(ServerState::Initializing),
            shutdown: None,
            accept_task: None,
            local_addr: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ServerState {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The bound address, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    fn set_state(&self, next: ServerState) {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = next;
    }

    /// Bind the listener and begin accepting connections
    ///
    /// Resolves with the bound address once the listener is live. Fails
    /// with `NotReady` unless the server is freshly constructed, and with
    /// `CantBind` when binding or listening fails.
    pub async fn start(&mut self, addr: SocketAddr) -> Result<SocketAddr, TransportError> {
        {
            let mut state = self
                .state
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if *state != ServerState::Initializing {
                return Err(TransportError::NotReady);
            }
            *state = ServerState::Starting;
        }

        let listener = match Self::bind(addr, self.config.backlog) {
            Ok(listener) => listener,
            Err(error) => {
                self.set_state(ServerState::Stopped);
                return Err(error);
            }
        };
        let local_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handler = Arc::clone(&self.handler);
        let config = self.config.clone();
        self.accept_task = Some(tokio::spawn(accept_loop(
            listener,
            handler,
            config,
            shutdown_rx,
        )));
        self.shutdown = Some(shutdown_tx);
        self.local_addr = Some(local_addr);
        self.set_state(ServerState::Started);

        debug!(%local_addr, framing = %self.config.framing, "server started");
        Ok(local_addr)
    }

    fn bind(addr: SocketAddr, backlog: u32) -> Result<TcpListener, TransportError> {
        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4(),
            SocketAddr::V6(_) => TcpSocket::new_v6(),
        }
        .map_err(|source| TransportError::cant_bind(addr.to_string(), source))?;
        socket
            .set_reuseaddr(true)
            .map_err(|source| TransportError::cant_bind(addr.to_string(), source))?;
        socket
            .bind(addr)
            .map_err(|source| TransportError::cant_bind(addr.to_string(), source))?;
        socket
            .listen(backlog)
            .map_err(|source| TransportError::cant_bind(addr.to_string(), source))
    }

    /// Stop accepting and close the listener
    ///
    /// Resolves once the listener's close is observed. Connection tasks
    /// are signalled to shut down but in-flight handler callbacks are not
    /// awaited. Must be called exactly once, from any thread.
    pub async fn stop(&mut self) -> Result<(), TransportError> {
        {
            let mut state = self
                .state
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if *state != ServerState::Started {
                return Err(TransportError::NotReady);
            }
            *state = ServerState::Stopping;
        }

        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }
        if let Some(task) = self.accept_task.take() {
            let _ = task.await;
        }
        self.set_state(ServerState::Stopped);
        debug!("server stopped");
        Ok(())
    }
}

impl Drop for TcpServer {
    fn drop(&mut self) {
        let state = self.state();
        if !matches!(state, ServerState::Initializing | ServerState::Stopped) {
            error!(?state, "TcpServer dropped without stop()");
            debug_assert!(false, "TcpServer dropped without stop()");
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    handler: Arc<dyn RequestHandler>,
    config: ServerConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    if let Err(error) = stream.set_nodelay(true) {
                        warn!(%peer, %error, "failed to set TCP_NODELAY");
                    }
                    debug!(%peer, "accepted connection");
                    tokio::spawn(serve_connection(
                        stream,
                        peer,
                        Arc::clone(&handler),
                        config.clone(),
                        shutdown.clone(),
                    ));
                }
                Err(error) => {
                    warn!(%error, "accept failed");
                }
            },
        }
    }
    // Dropping the listener here is what `stop` awaits.
    debug!("listener closed");
}

/// Outbound messages on a connection's write channel
enum Outbound {
    /// A regular reply; write order is reply order
    Reply(JsonRpcResponse),
    /// The last response before the connection closes
    Closing(JsonRpcResponse),
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<dyn RequestHandler>,
    config: ServerConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    let (read_half, write_half) = stream.into_split();
    let mut reader = FrameReader::new(
        read_half,
        MessageCodec::<JsonRpcRequest>::new(config.framing, config.max_payload),
        config.timeout,
    );
    let (reply_tx, reply_rx) = mpsc::channel::<Outbound>(OUTBOUND_QUEUE);
    let writer = tokio::spawn(write_loop(
        FramedWrite::new(
            write_half,
            MessageCodec::<JsonRpcResponse>::new(config.framing, config.max_payload),
        ),
        reply_rx,
        peer,
    ));

    let closing: Option<JsonRpcError> = loop {
        tokio::select! {
            _ = shutdown.changed() => break None,
            inbound = reader.next() => match inbound {
                Ok(Inbound::Frame(request)) => {
                    dispatch(request, &handler, &reply_tx);
                }
                Ok(Inbound::Idle { buffered: true }) => {
                    // A partial frame that never completed is malformed.
                    let error = CodecError::bad_framing("idle timeout with a partial frame buffered");
                    warn!(%peer, %error, "closing connection");
                    break Some(close_error(&error));
                }
                Ok(Inbound::Idle { buffered: false }) => {
                    let error = TransportError::timeout(config.timeout.as_millis() as u64);
                    warn!(%peer, %error, "closing connection");
                    break Some(JsonRpcError::internal_error(error.to_string()));
                }
                Ok(Inbound::Eof) => {
                    debug!(%peer, "peer closed connection");
                    break None;
                }
                Err(error) => {
                    warn!(%peer, %error, "closing connection");
                    break Some(close_error(&error));
                }
            },
        }
    };

    if let Some(error) = closing {
        // Best-effort parting response with id "unknown"; awaiting the
        // writer guarantees it is flushed before the socket drops.
        let response = JsonRpcResponse::failure(error, UNKNOWN_ID);
        let _ = reply_tx.send(Outbound::Closing(response)).await;
        drop(reply_tx);
        let _ = writer.await;
    }
    // On the clean paths the writer drains remaining replies from
    // in-flight handlers on its own and exits when the last sender drops.
}

/// Invoke the handler on its own task; replies may interleave freely
fn dispatch(
    request: JsonRpcRequest,
    handler: &Arc<dyn RequestHandler>,
    reply_tx: &mpsc::Sender<Outbound>,
) {
    let handler = Arc::clone(handler);
    let reply_tx = reply_tx.clone();
    tokio::spawn(async move {
        let id = request.id.clone();
        let response = match handler.handle(&request.method, request.params_value()).await {
            Ok(result) => JsonRpcResponse::success(result.into(), id),
            Err(error) => JsonRpcResponse::failure(error.into(), id),
        };
        // The connection may be gone by the time a slow handler replies.
        let _ = reply_tx.send(Outbound::Reply(response)).await;
    });
}

async fn write_loop(
    mut sink: FramedWrite<OwnedWriteHalf, MessageCodec<JsonRpcResponse>>,
    mut reply_rx: mpsc::Receiver<Outbound>,
    peer: SocketAddr,
) {
    while let Some(message) = reply_rx.recv().await {
        match message {
            Outbound::Reply(response) => {
                if let Err(error) = sink.send(&response).await {
                    warn!(%peer, %error, "failed to write response");
                    break;
                }
            }
            Outbound::Closing(response) => {
                if let Err(error) = sink.send(&response).await {
                    warn!(%peer, %error, "failed to write closing response");
                }
                break;
            }
        }
    }
}

/// Map a codec failure to the wire error of the parting response
fn close_error(error: &CodecError) -> JsonRpcError {
    match error {
        CodecError::BadFraming(_) | CodecError::BadJson(_) | CodecError::NotJson => {
            JsonRpcError::parse_error(error.to_string())
        }
        CodecError::RequestTooLarge { .. } => JsonRpcError::invalid_request(error.to_string()),
        CodecError::Io(_) => JsonRpcError::internal_error(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::error_codes;

    #[test]
    fn test_close_error_mapping() {
        let err = close_error(&CodecError::bad_framing("x"));
        assert_eq!(err.code, error_codes::PARSE_ERROR);

        let err = close_error(&CodecError::request_too_large(2, 1));
        assert_eq!(err.code, error_codes::INVALID_REQUEST);

        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err = close_error(&CodecError::Io(io));
        assert_eq!(err.code, error_codes::INTERNAL_ERROR);
    }

    #[test]
    fn test_state_is_initializing_on_construction() {
        use crate::protocol::{RpcError, RpcValue};

        async fn noop(_method: String, _params: RpcValue) -> Result<RpcValue, RpcError> {
            Ok(RpcValue::None)
        }

        let server = TcpServer::new(ServerConfig::default(), noop);
        assert_eq!(server.state(), ServerState::Initializing);
        // Dropping before start() is allowed.
    }
}
