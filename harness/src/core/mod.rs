//! Readiness fan-out and retry primitives

pub mod readiness;
pub mod retry;

pub use readiness::{ProbeSet, wait_until_ready};
pub use retry::{RetryExhausted, RetryPolicy, retry};
