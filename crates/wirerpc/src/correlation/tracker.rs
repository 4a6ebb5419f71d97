//! Call Tracker
//!
//! Correlates outbound requests with inbound responses. Matching is keyed
//! by request id; a FIFO order of registration is retained alongside the
//! map so that frame-level failures (which carry no id) can be charged to
//! the oldest in-flight call, and so teardown drains promises in submission
//! order.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::Mutex;

// Layer 2: Third-party crate imports
use dashmap::DashMap;
use tokio::sync::oneshot;
use tracing::warn;

// Layer 3: Internal module imports
use crate::protocol::JsonRpcResponse;
use crate::transport::TransportError;

/// What a pending call eventually resolves to: the peer's response, or the
/// transport failure that ended it
pub type CallOutcome = Result<JsonRpcResponse, TransportError>;

/// A registered call awaiting its response
#[derive(Debug)]
pub struct PendingCall {
    sender: oneshot::Sender<CallOutcome>,
}

impl PendingCall {
    /// Wrap the promise half of a call
    pub fn new(sender: oneshot::Sender<CallOutcome>) -> Self {
        Self { sender }
    }

    /// Resolve the call; a dropped receiver is not an error
    pub fn resolve(self, outcome: CallOutcome) {
        if self.sender.send(outcome).is_err() {
            warn!("pending call receiver dropped before resolution");
        }
    }
}

/// Id-keyed pending-call table with FIFO drain order
///
/// All operations are safe from any task; the client submits from caller
/// tasks while the connection task completes and drains.
#[derive(Debug, Default)]
pub struct CallTracker {
    pending: DashMap<String, PendingCall>,
    order: Mutex<VecDeque<String>>,
}

impl CallTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
        }
    }

    /// Register a call under its request id
    ///
    /// Ids must be unique within the pending window; a duplicate is
    /// rejected and the supplied promise is left untouched.
    pub fn register(&self, id: impl Into<String>, call: PendingCall) -> Result<(), PendingCall> {
        let id = id.into();
        if self.pending.contains_key(&id) {
            return Err(call);
        }
        self.order
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(id.clone());
        self.pending.insert(id, call);
        Ok(())
    }

    /// Complete the call registered under `id` with the peer's response
    ///
    /// Returns false when no such call is pending (stale or unknown id).
    pub fn complete(&self, id: &str, response: JsonRpcResponse) -> bool {
        match self.pending.remove(id) {
            Some((_, call)) => {
                call.resolve(Ok(response));
                true
            }
            None => false,
        }
    }

    /// Remove and return the oldest in-flight call
    ///
    /// Used when a failure carries no id to correlate by.
    pub fn pop_head(&self) -> Option<(String, PendingCall)> {
        let mut order = self
            .order
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        while let Some(id) = order.pop_front() {
            if let Some((id, call)) = self.pending.remove(&id) {
                return Some((id, call));
            }
            // Already completed by id; skip the stale order entry.
        }
        None
    }

    /// Fail the call registered under `id`
    pub fn fail(&self, id: &str, error: TransportError) -> bool {
        match self.pending.remove(id) {
            Some((_, call)) => {
                call.resolve(Err(error));
                true
            }
            None => false,
        }
    }

    /// Fail every pending call in FIFO order
    ///
    /// The factory is invoked once per drained call since transport errors
    /// are not clonable.
    pub fn drain(&self, error: impl Fn() -> TransportError) {
        while let Some((_, call)) = self.pop_head() {
            call.resolve(Err(error()));
        }
    }

    /// Number of in-flight calls
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when no call is in flight
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
