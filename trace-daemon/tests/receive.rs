//! End-to-end receive tests: datagrams sent over loopback UDP and pulled
//! back out of the daemon mailbox.

mod fixtures;

use std::sync::Arc;
use std::time::{Duration, Instant};

use fixtures::*;
use shared::TraceId;
use tokio::net::UdpSocket;
use trace_daemon::{DaemonConfig, DaemonError, MIN_MAILBOX_CAPACITY, TestDaemon};

#[tokio::test]
async fn test_minimal_segment_is_received_and_sampled() {
    let (_ctx, daemon, emitter) = daemon_with_emitter().await;

    emitter.emit_raw(MINIMAL_DATAGRAM).await.unwrap();

    let segment = daemon.recv().await.expect("segment should arrive");
    assert_eq!(segment.id, "abc");
    assert_eq!(segment.trace_id, "1-x");
    assert!(segment.sampled);

    daemon.close().await;
}

#[tokio::test]
async fn test_sender_sampled_false_is_overridden() {
    let (ctx, daemon, emitter) = daemon_with_emitter().await;

    let mut segment = ctx.begin_subsegment("unsampled");
    segment.sampled = false;
    emitter.emit(&segment).await.unwrap();

    let received = daemon.recv().await.unwrap();
    assert_eq!(received.id, segment.id);
    assert_eq!(received.parent_id, segment.parent_id);
    assert!(received.sampled);

    daemon.close().await;
}

#[tokio::test]
async fn test_bad_json_yields_decode_error() {
    let (_ctx, daemon, emitter) = daemon_with_emitter().await;

    emitter.emit_raw(BAD_JSON_DATAGRAM).await.unwrap();

    let err = daemon.recv().await.unwrap_err();
    assert!(matches!(err, DaemonError::Decode(_)));
    assert!(err.is_decode_error());
    assert!(!err.is_timeout());

    daemon.close().await;
}

#[tokio::test]
async fn test_headerless_datagram_yields_decode_error() {
    let (_ctx, daemon, emitter) = daemon_with_emitter().await;

    emitter.emit_raw(HEADERLESS_DATAGRAM).await.unwrap();

    let err = daemon.recv().await.unwrap_err();
    assert!(matches!(err, DaemonError::MissingHeader));

    daemon.close().await;
}

#[tokio::test]
async fn test_decode_errors_do_not_stop_the_loop() {
    let (_ctx, daemon, emitter) = daemon_with_emitter().await;

    emitter.emit_raw(BAD_JSON_DATAGRAM).await.unwrap();
    emitter.emit_raw(MINIMAL_DATAGRAM).await.unwrap();

    assert!(daemon.recv().await.unwrap_err().is_decode_error());
    assert_eq!(daemon.recv().await.unwrap().id, "abc");

    daemon.close().await;
}

#[tokio::test]
async fn test_results_arrive_in_send_order() {
    let (_ctx, daemon, emitter) = daemon_with_emitter().await;
    let trace_id = TraceId::new();
    let count = 50;

    for n in 0..count {
        emitter.emit(&numbered_segment(&trace_id, n)).await.unwrap();
    }

    for n in 0..count {
        let segment = daemon.recv().await.expect("every datagram should arrive");
        assert_eq!(segment.name, format!("segment-{n}"));
        assert_eq!(segment.trace_id, trace_id.as_str());
    }

    daemon.close().await;
}

#[tokio::test]
async fn test_recv_times_out_after_default_window() {
    let (_ctx, daemon) = TestDaemon::start().await.unwrap();

    let started = Instant::now();
    let err = daemon.recv().await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(err.is_timeout(), "expected timeout, got {err}");
    assert!(elapsed >= Duration::from_millis(490), "timed out early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5));

    daemon.close().await;
}

#[tokio::test]
async fn test_configured_timeout_is_used() {
    let (_ctx, daemon) = daemon_with_timeout(Duration::from_millis(50)).await;

    match daemon.recv().await {
        Err(DaemonError::Timeout(window)) => assert_eq!(window, Duration::from_millis(50)),
        other => panic!("expected timeout, got {other:?}"),
    }

    daemon.close().await;
}

#[tokio::test]
async fn test_close_twice_is_safe() {
    let (ctx, daemon) = TestDaemon::start().await.unwrap();

    daemon.close().await;
    daemon.close().await;

    assert!(daemon.is_closed());
    assert!(ctx.is_cancelled());
    assert!(matches!(daemon.recv().await, Err(DaemonError::Closed)));
}

#[tokio::test]
async fn test_close_unblocks_pending_recv() {
    let (_ctx, daemon) = TestDaemon::start().await.unwrap();
    let daemon = Arc::new(daemon);

    let waiter = {
        let daemon = daemon.clone();
        tokio::spawn(async move { daemon.recv_timeout(Duration::from_secs(30)).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    let started = Instant::now();
    daemon.close().await;

    let result = tokio::time::timeout(Duration::from_secs(5), waiter)
        .await
        .expect("pending recv should unblock")
        .unwrap();
    assert!(matches!(result, Err(DaemonError::Closed)));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_independent_daemons_do_not_share_results() {
    let (_ctx_a, daemon_a, emitter_a) = daemon_with_emitter().await;
    let (_ctx_b, daemon_b) = daemon_with_timeout(Duration::from_millis(100)).await;

    assert_ne!(daemon_a.local_addr(), daemon_b.local_addr());

    emitter_a.emit_raw(MINIMAL_DATAGRAM).await.unwrap();
    assert!(daemon_a.recv().await.is_ok());
    assert!(daemon_b.recv().await.unwrap_err().is_timeout());

    daemon_a.close().await;
    daemon_b.close().await;
}

#[tokio::test]
async fn test_close_with_full_mailbox_terminates() {
    let (_ctx, daemon, emitter) = daemon_with_emitter().await;
    let addr = daemon.local_addr();

    // Twice the default mailbox, none of it consumed
    for _ in 0..400 {
        emitter.emit_raw(MINIMAL_DATAGRAM).await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    tokio::time::timeout(Duration::from_secs(3), daemon.close())
        .await
        .expect("close should not wait on a full mailbox");

    assert!(UdpSocket::bind(addr).await.is_ok());
    assert!(matches!(daemon.recv().await, Err(DaemonError::Closed)));
}

#[tokio::test]
async fn test_full_mailbox_resumes_in_order_once_drained() {
    let config = DaemonConfig::builder()
        .mailbox_capacity(MIN_MAILBOX_CAPACITY)
        .build();
    let (ctx, daemon) = TestDaemon::start_with(config).await.unwrap();
    let emitter = ctx.emitter().await.unwrap();
    let trace_id = TraceId::new();
    let count = MIN_MAILBOX_CAPACITY + 30;

    for n in 0..count {
        emitter.emit(&numbered_segment(&trace_id, n)).await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    for n in 0..count {
        let segment = daemon.recv().await.expect("datagram held back by the full mailbox");
        assert_eq!(segment.name, format!("segment-{n}"));
    }

    daemon.close().await;
}
