//! Trace execution context
//!
//! A [`TraceContext`] is handed out alongside every daemon. It carries the
//! daemon address that instrumentation under test should send segments to,
//! a begun root segment, and a cancellation token that fires when the daemon
//! is closed.

use serde_json::json;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use shared::{Segment, TraceId};

use crate::emitter::SegmentEmitter;
use crate::error::DaemonResult;

/// Decides whether a new segment is sampled
pub trait SamplingStrategy: Send + Sync + fmt::Debug {
    fn should_trace(&self, segment_name: &str) -> bool;
}

/// Samples everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysSample;

impl SamplingStrategy for AlwaysSample {
    fn should_trace(&self, _segment_name: &str) -> bool {
        true
    }
}

/// Samples nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverSample;

impl SamplingStrategy for NeverSample {
    fn should_trace(&self, _segment_name: &str) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct TraceContext {
    daemon_addr: SocketAddr,
    service_version: String,
    request_id: Uuid,
    root: Segment,
    sampling: Arc<dyn SamplingStrategy>,
    cancel: CancellationToken,
}

impl TraceContext {
    /// Build a context routed at `daemon_addr` with a freshly begun root segment
    pub fn new(daemon_addr: SocketAddr, service_version: &str, cancel: CancellationToken) -> Self {
        let request_id = Uuid::new_v4();
        let sampling: Arc<dyn SamplingStrategy> = Arc::new(AlwaysSample);

        let name = Uuid::new_v4().to_string();
        let mut root = Segment::begin(name.clone(), &TraceId::new());
        root.sampled = sampling.should_trace(&name);
        root.service = Some(json!({ "version": service_version }));
        root.aws = Some(json!({ "request_id": request_id.to_string() }));

        Self {
            daemon_addr,
            service_version: service_version.to_string(),
            request_id,
            root,
            sampling,
            cancel,
        }
    }

    /// Replace the sampling strategy used for new subsegments
    pub fn with_sampling(mut self, sampling: Arc<dyn SamplingStrategy>) -> Self {
        self.sampling = sampling;
        self
    }

    /// Address instrumentation should send segments to
    pub fn daemon_addr(&self) -> SocketAddr {
        self.daemon_addr
    }

    pub fn service_version(&self) -> &str {
        &self.service_version
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn root_segment(&self) -> &Segment {
        &self.root
    }

    pub fn trace_id(&self) -> &str {
        &self.root.trace_id
    }

    /// Begin a subsegment of the root segment
    pub fn begin_subsegment(&self, name: &str) -> Segment {
        let mut segment = self.root.begin_subsegment(name);
        segment.sampled = self.sampling.should_trace(name);
        segment
    }

    /// Connect an emitter to this context's daemon
    pub async fn emitter(&self) -> DaemonResult<SegmentEmitter> {
        SegmentEmitter::connect(self.daemon_addr).await
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the owning daemon is closed
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}
