//! Shared fixtures for trace daemon integration tests

use std::time::Duration;

use shared::{Segment, TraceId};
use trace_daemon::{DaemonConfig, SegmentEmitter, TestDaemon, TraceContext};

/// Datagram carrying a minimal well-formed segment
pub const MINIMAL_DATAGRAM: &[u8] =
    b"1234567890\n{\"id\":\"abc\",\"trace_id\":\"1-x\",\"start_time\":1.0,\"end_time\":2.0}";

/// Datagram with a header but an unparseable body
pub const BAD_JSON_DATAGRAM: &[u8] = b"header\n{not json}";

/// Datagram with no header line at all
pub const HEADERLESS_DATAGRAM: &[u8] = b"{\"id\":\"abc\"}";

/// Start a daemon plus an emitter pointed at it
pub async fn daemon_with_emitter() -> (TraceContext, TestDaemon, SegmentEmitter) {
    let (ctx, daemon) = TestDaemon::start().await.expect("daemon should bind");
    let emitter = ctx.emitter().await.expect("emitter should connect");
    (ctx, daemon, emitter)
}

/// Start a daemon with a custom receive window
pub async fn daemon_with_timeout(timeout: Duration) -> (TraceContext, TestDaemon) {
    let config = DaemonConfig::builder().recv_timeout(timeout).build();
    TestDaemon::start_with(config)
        .await
        .expect("daemon should bind")
}

/// Closed segment with a numbered name
pub fn numbered_segment(trace_id: &TraceId, n: usize) -> Segment {
    let mut segment = Segment::begin(format!("segment-{n}"), trace_id);
    segment.annotate("seq", n as u64);
    segment.close();
    segment
}
