//! Harness error types

use std::time::Duration;
use thiserror::Error;

use shared::{Service, SharedError};
use trace_daemon::DaemonError;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Container operation failed: {message}")]
    Container { message: String },

    #[error("Emulator container not started")]
    NotStarted,

    #[error("Readiness probe for {service} failed: {message}")]
    Probe { service: Service, message: String },

    #[error("Readiness probe panicked: {message}")]
    ProbePanicked { message: String },

    #[error("Emulator not ready after {waited:?}: {last_error}")]
    ReadinessTimeout {
        waited: Duration,
        last_error: Box<HarnessError>,
    },

    #[error("Failed to provision {resource}: {message}")]
    Provision { resource: String, message: String },

    #[error("Trace daemon error: {0}")]
    Daemon(#[from] DaemonError),

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
