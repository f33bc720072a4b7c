//! Test trace daemon
//!
//! A local stand-in for a tracing collector. The daemon binds a UDP socket on
//! an ephemeral loopback port and runs a drain loop that decodes every
//! datagram into a segment result and queues it in a bounded mailbox. Tests
//! pull results with [`TestDaemon::recv`].
//!
//! ```rust,no_run
//! # async fn demo() -> trace_daemon::DaemonResult<()> {
//! use trace_daemon::TestDaemon;
//!
//! let (ctx, daemon) = TestDaemon::start().await?;
//! let emitter = ctx.emitter().await?;
//! emitter.emit(ctx.root_segment()).await?;
//!
//! let segment = daemon.recv().await?;
//! assert!(segment.sampled);
//! daemon.close().await;
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use shared::Segment;

use crate::codec::decode_datagram;
use crate::config::{DaemonConfig, MIN_BUFFER_SIZE, MIN_MAILBOX_CAPACITY};
use crate::context::TraceContext;
use crate::error::{DaemonError, DaemonResult};

/// One decoded datagram
pub type SegmentResult = DaemonResult<Segment>;

pub struct TestDaemon {
    local_addr: SocketAddr,
    recv_timeout: Duration,
    mailbox: Mutex<mpsc::Receiver<SegmentResult>>,
    cancel: CancellationToken,
    closed: AtomicBool,
    drain_task: Mutex<Option<JoinHandle<()>>>,
}

impl TestDaemon {
    /// Start a daemon with the default configuration
    pub async fn start() -> DaemonResult<(TraceContext, TestDaemon)> {
        Self::start_with(DaemonConfig::default()).await
    }

    /// Bind, spawn the drain loop and return a context routed at the daemon
    pub async fn start_with(config: DaemonConfig) -> DaemonResult<(TraceContext, TestDaemon)> {
        let socket = bind_first(&config.bind_candidates()).await?;
        let local_addr = socket.local_addr().map_err(|source| DaemonError::Bind {
            attempted: config.bind_candidates(),
            source,
        })?;

        let (tx, rx) = mpsc::channel(config.mailbox_capacity.max(MIN_MAILBOX_CAPACITY));
        let cancel = CancellationToken::new();

        let drain_task = tokio::spawn(drain_loop(
            socket,
            tx,
            cancel.clone(),
            config.buffer_size.max(MIN_BUFFER_SIZE),
        ));

        tracing::info!(addr = %local_addr, "📡 Trace daemon listening");

        let ctx = TraceContext::new(local_addr, &config.service_version, cancel.child_token());
        let daemon = TestDaemon {
            local_addr,
            recv_timeout: config.recv_timeout,
            mailbox: Mutex::new(rx),
            cancel,
            closed: AtomicBool::new(false),
            drain_task: Mutex::new(Some(drain_task)),
        };

        Ok((ctx, daemon))
    }

    /// Address the daemon is listening on
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Take the next result, waiting at most the configured receive timeout
    pub async fn recv(&self) -> SegmentResult {
        self.recv_timeout(self.recv_timeout).await
    }

    /// Take the next result, waiting at most `timeout`
    ///
    /// Returns `Timeout` when nothing arrives in time and `Closed` if the
    /// daemon is closed before or while waiting.
    pub async fn recv_timeout(&self, timeout: Duration) -> SegmentResult {
        if self.cancel.is_cancelled() {
            return Err(DaemonError::Closed);
        }

        let next = async {
            let mut mailbox = self.mailbox.lock().await;
            mailbox.recv().await
        };

        tokio::select! {
            _ = self.cancel.cancelled() => Err(DaemonError::Closed),
            outcome = tokio::time::timeout(timeout, next) => match outcome {
                Ok(Some(result)) => result,
                Ok(None) => Err(DaemonError::Closed),
                Err(_) => Err(DaemonError::Timeout(timeout)),
            },
        }
    }

    /// Stop the drain loop and release the socket
    ///
    /// Safe to call more than once, including concurrently. Every call
    /// returns only after the drain task has exited; undelivered results are
    /// discarded.
    pub async fn close(&self) {
        let first = !self.closed.swap(true, Ordering::SeqCst);
        self.cancel.cancel();

        // Concurrent callers queue here until the task has been joined
        let mut drain_task = self.drain_task.lock().await;
        if let Some(task) = drain_task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "trace daemon drain task ended abnormally");
            }
        }
        drop(drain_task);

        if first {
            tracing::info!(addr = %self.local_addr, "🛑 Trace daemon closed");
        }
    }
}

impl Drop for TestDaemon {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.drain_task.get_mut().take() {
            task.abort();
        }
    }
}

async fn bind_first(candidates: &[SocketAddr]) -> DaemonResult<UdpSocket> {
    let mut last_error = None;

    for addr in candidates {
        match UdpSocket::bind(addr).await {
            Ok(socket) => return Ok(socket),
            Err(e) => {
                tracing::warn!(addr = %addr, error = %e, "trace daemon bind failed");
                last_error = Some(e);
            }
        }
    }

    Err(DaemonError::Bind {
        attempted: candidates.to_vec(),
        source: last_error.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "no bind address configured")
        }),
    })
}

async fn drain_loop(
    socket: UdpSocket,
    mailbox: mpsc::Sender<SegmentResult>,
    cancel: CancellationToken,
    buffer_size: usize,
) {
    let mut buffer = vec![0u8; buffer_size];

    loop {
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            read = socket.recv_from(&mut buffer) => read,
        };

        let result = match read {
            Ok((n, from)) => {
                let decoded = decode_datagram(&buffer[..n]);
                match &decoded {
                    Ok(segment) => {
                        tracing::debug!(from = %from, segment_id = %segment.id, "received segment")
                    }
                    Err(e) => tracing::warn!(from = %from, error = %e, "undecodable datagram"),
                }
                decoded
            }
            Err(e) => {
                tracing::warn!(error = %e, "trace daemon read failed");
                Err(DaemonError::Read(e))
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            sent = mailbox.send(result) => {
                if sent.is_err() {
                    // Consumer side dropped
                    break;
                }
            }
        }
    }

    tracing::debug!("trace daemon drain loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::SegmentEmitter;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_start_binds_loopback_ephemeral_port() {
        let (ctx, daemon) = TestDaemon::start().await.unwrap();

        assert!(daemon.local_addr().ip().is_loopback());
        assert_ne!(daemon.local_addr().port(), 0);
        assert_eq!(ctx.daemon_addr(), daemon.local_addr());
        assert_eq!(ctx.service_version(), "TestVersion");

        daemon.close().await;
    }

    #[tokio::test]
    async fn test_bind_failure_is_an_error() {
        // Non-local address cannot be bound
        let addr: SocketAddr = "192.0.2.1:0".parse().unwrap();
        let config = DaemonConfig::builder()
            .bind_addr(addr)
            .fallback_bind_addr(None)
            .build();

        match TestDaemon::start_with(config).await {
            Err(DaemonError::Bind { attempted, .. }) => assert_eq!(attempted, vec![addr]),
            Err(other) => panic!("expected bind error, got {other}"),
            Ok(_) => panic!("expected bind error"),
        }
    }

    #[tokio::test]
    async fn test_close_cancels_context() {
        let (ctx, daemon) = TestDaemon::start().await.unwrap();
        assert!(!ctx.is_cancelled());

        daemon.close().await;

        assert!(ctx.is_cancelled());
        assert!(daemon.is_closed());
    }

    #[tokio::test]
    async fn test_recv_after_close_reports_closed() {
        let (_ctx, daemon) = TestDaemon::start().await.unwrap();
        daemon.close().await;

        assert!(matches!(daemon.recv().await, Err(DaemonError::Closed)));
    }

    #[tokio::test]
    async fn test_close_releases_socket() {
        let (_ctx, daemon) = TestDaemon::start().await.unwrap();
        let addr = daemon.local_addr();
        daemon.close().await;

        // Port can be reclaimed once the drain task has exited
        let rebound = UdpSocket::bind(addr).await;
        assert!(rebound.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_close_waits_for_teardown() {
        let (_ctx, daemon) = TestDaemon::start().await.unwrap();
        let addr = daemon.local_addr();
        let daemon = Arc::new(daemon);

        let closers: Vec<_> = (0..4)
            .map(|_| {
                let daemon = daemon.clone();
                tokio::spawn(async move { daemon.close().await })
            })
            .collect();

        // Whichever caller finishes first, the socket is already released
        for closer in closers {
            closer.await.unwrap();
            assert!(UdpSocket::bind(addr).await.is_ok());
        }
        assert!(daemon.is_closed());
    }

    #[tokio::test]
    async fn test_undersized_buffer_is_raised_at_start() {
        let config = DaemonConfig {
            buffer_size: 0,
            ..DaemonConfig::default()
        };
        let (_ctx, daemon) = TestDaemon::start_with(config).await.unwrap();
        let emitter = SegmentEmitter::connect(daemon.local_addr()).await.unwrap();

        emitter
            .emit_raw(b"header\n{\"id\":\"abc\",\"trace_id\":\"1-x\",\"start_time\":1.0}")
            .await
            .unwrap();

        let segment = daemon.recv().await.unwrap();
        assert_eq!(segment.id, "abc");

        daemon.close().await;
    }
}
