//! Correlation Layer - Pending-Call Tracking
//!
//! The client registers every outbound request here and the connection
//! task resolves it when the matching response arrives. Matching is keyed
//! by request id; registration order is kept for failures that carry no id
//! and for FIFO teardown. See [`tracker::CallTracker`].

pub mod tracker;

pub use tracker::{CallOutcome, CallTracker, PendingCall};
