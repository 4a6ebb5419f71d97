//! Endpoint Configuration
//!
//! Both endpoints share the framing discipline, the inbound-read idle
//! timeout, and the payload cap; the server additionally carries the
//! accept backlog. There is deliberately no send timeout, no total-call
//! deadline, and no cancellation of a submitted call.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 3: Internal module imports
use crate::protocol::constants::defaults;
use crate::transport::Framing;

/// Configuration for a [`crate::endpoint::TcpServer`]
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Wire framing discipline; both peers must agree
    pub framing: Framing,
    /// Inbound-read idle timeout; resets on every inbound byte
    pub timeout: Duration,
    /// Accept queue depth for the listener
    pub backlog: u32,
    /// Maximum size of a single frame in bytes
    pub max_payload: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            framing: Framing::default(),
            timeout: Duration::from_secs(defaults::TIMEOUT_SECONDS),
            backlog: defaults::BACKLOG,
            max_payload: defaults::MAX_PAYLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Create a configuration with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the framing discipline
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Set the inbound-read idle timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the accept queue depth
    pub fn with_backlog(mut self, backlog: u32) -> Self {
        self.backlog = backlog;
        self
    }

    /// Set the single-frame payload cap
    pub fn with_max_payload(mut self, max_payload: usize) -> Self {
        self.max_payload = max_payload;
        self
    }
}

/// Configuration for a [`crate::endpoint::TcpClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Wire framing discipline; both peers must agree
    pub framing: Framing,
    /// Inbound-read idle timeout; resets on every inbound byte
    pub timeout: Duration,
    /// Maximum size of a single frame in bytes
    pub max_payload: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            framing: Framing::default(),
            timeout: Duration::from_secs(defaults::TIMEOUT_SECONDS),
            max_payload: defaults::MAX_PAYLOAD_BYTES,
        }
    }
}

impl ClientConfig {
    /// Create a configuration with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the framing discipline
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Set the inbound-read idle timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the single-frame payload cap
    pub fn with_max_payload(mut self, max_payload: usize) -> Self {
        self.max_payload = max_payload;
        self
    }
}
