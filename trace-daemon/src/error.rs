//! Trace daemon error types

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Result type for trace daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;

/// Trace daemon error types
///
/// `Read`, `MissingHeader` and `Decode` are per-datagram failures handed to
/// the consumer as values. `Bind` is the only failure fatal to a daemon.
#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("Failed to bind trace daemon on {attempted:?}: {source}")]
    Bind {
        attempted: Vec<SocketAddr>,
        source: std::io::Error,
    },

    #[error("Failed to read datagram: {0}")]
    Read(std::io::Error),

    #[error("Datagram has no header line")]
    MissingHeader,

    #[error("Failed to decode segment: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No segment received within {0:?}")]
    Timeout(Duration),

    #[error("Trace daemon is closed")]
    Closed,

    #[error("Failed to encode segment: {message}")]
    Encode { message: String },

    #[error("Failed to emit segment to {addr}: {source}")]
    Emit {
        addr: SocketAddr,
        source: std::io::Error,
    },
}

impl DaemonError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DaemonError::Timeout(_))
    }

    /// True for failures produced while turning a datagram into a segment
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            DaemonError::Read(_) | DaemonError::MissingHeader | DaemonError::Decode(_)
        )
    }
}
