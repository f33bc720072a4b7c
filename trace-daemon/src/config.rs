//! Trace daemon configuration
//!
//! Provides a builder for the daemon's bind addresses, receive window and
//! mailbox sizing.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

/// Smallest mailbox the daemon will run with
pub const MIN_MAILBOX_CAPACITY: usize = 100;

/// Smallest datagram buffer; anything shorter truncates ordinary segments
pub const MIN_BUFFER_SIZE: usize = 4 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct DaemonConfig {
    /// Primary bind address, port 0 for an ephemeral port
    pub bind_addr: SocketAddr,
    /// Tried when the primary address cannot be bound
    pub fallback_bind_addr: Option<SocketAddr>,
    /// How long `recv` waits for a result
    pub recv_timeout: Duration,
    /// Pending results held before the drain loop waits on the consumer
    pub mailbox_capacity: usize,
    /// Largest datagram accepted without truncation
    pub buffer_size: usize,
    /// Service version stamped on test contexts
    pub service_version: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
            fallback_bind_addr: Some(SocketAddr::from((Ipv6Addr::LOCALHOST, 0))),
            recv_timeout: Duration::from_millis(500),
            mailbox_capacity: 200,
            buffer_size: 64 * 1024,
            service_version: "TestVersion".to_string(),
        }
    }
}

impl DaemonConfig {
    /// Create a new builder
    pub fn builder() -> DaemonConfigBuilder {
        DaemonConfigBuilder::new()
    }

    /// Addresses to try in order when binding
    pub fn bind_candidates(&self) -> Vec<SocketAddr> {
        let mut candidates = vec![self.bind_addr];
        candidates.extend(self.fallback_bind_addr);
        candidates
    }
}

pub struct DaemonConfigBuilder {
    config: DaemonConfig,
}

impl DaemonConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: DaemonConfig::default(),
        }
    }

    /// Set the primary bind address
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.config.bind_addr = addr;
        self
    }

    /// Set the fallback bind address (None disables the fallback)
    pub fn fallback_bind_addr(mut self, addr: Option<SocketAddr>) -> Self {
        self.config.fallback_bind_addr = addr;
        self
    }

    /// Set how long `recv` waits for a result
    pub fn recv_timeout(mut self, timeout: Duration) -> Self {
        self.config.recv_timeout = timeout;
        self
    }

    /// Set mailbox capacity (raised to the minimum if smaller)
    pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
        self.config.mailbox_capacity = capacity.max(MIN_MAILBOX_CAPACITY);
        self
    }

    /// Set receive buffer size in bytes, raised to `MIN_BUFFER_SIZE` if smaller
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.config.buffer_size = size.max(MIN_BUFFER_SIZE);
        self
    }

    pub fn service_version<S: Into<String>>(mut self, version: S) -> Self {
        self.config.service_version = version.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> DaemonConfig {
        self.config
    }
}

impl Default for DaemonConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
