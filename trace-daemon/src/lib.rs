//! Local trace daemon for integration tests
//!
//! Code under test that emits trace segments over UDP needs a collector to
//! send them to. This crate provides an ephemeral one:
//!
//! - [`TestDaemon`] binds a loopback port, decodes incoming segments and
//!   queues them for the test to pull with a bounded wait
//! - [`TraceContext`] carries the daemon address and a begun root segment
//!   into the code under test
//! - [`SegmentEmitter`] sends segments to a daemon

pub mod codec;
pub mod config;
pub mod context;
pub mod daemon;
pub mod emitter;
pub mod error;

pub use codec::{ENVELOPE_HEADER, decode_datagram, encode_datagram};
pub use config::{DaemonConfig, DaemonConfigBuilder, MIN_BUFFER_SIZE, MIN_MAILBOX_CAPACITY};
pub use context::{AlwaysSample, NeverSample, SamplingStrategy, TraceContext};
pub use daemon::{SegmentResult, TestDaemon};
pub use emitter::SegmentEmitter;
pub use error::{DaemonError, DaemonResult};
