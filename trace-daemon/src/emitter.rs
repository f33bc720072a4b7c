//! UDP segment emitter
//!
//! Sends enveloped segments to a daemon address. Instrumentation under test
//! uses it to report segments; tests also use `emit_raw` to send arbitrary
//! datagrams.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;

use shared::Segment;

use crate::codec::encode_datagram;
use crate::error::{DaemonError, DaemonResult};

pub struct SegmentEmitter {
    socket: UdpSocket,
    target: SocketAddr,
}

impl SegmentEmitter {
    /// Bind an ephemeral local socket and connect it to `target`
    pub async fn connect(target: SocketAddr) -> DaemonResult<Self> {
        let local = if target.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };

        let socket = UdpSocket::bind(local)
            .await
            .map_err(|source| DaemonError::Emit { addr: target, source })?;
        socket
            .connect(target)
            .await
            .map_err(|source| DaemonError::Emit { addr: target, source })?;

        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Encode and send one segment
    pub async fn emit(&self, segment: &Segment) -> DaemonResult<()> {
        let datagram = encode_datagram(segment)?;
        tracing::debug!(segment_id = %segment.id, bytes = datagram.len(), "emitting segment");
        self.emit_raw(&datagram).await
    }

    /// Send a datagram as-is
    pub async fn emit_raw(&self, datagram: &[u8]) -> DaemonResult<()> {
        self.socket
            .send(datagram)
            .await
            .map_err(|source| DaemonError::Emit {
                addr: self.target,
                source,
            })?;
        Ok(())
    }
}
