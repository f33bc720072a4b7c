//! Core types used throughout the harness

pub mod endpoints;
pub mod segment;

pub use endpoints::*;
pub use segment::*;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{SharedError, SharedResult};

/// Trace identifier in the `1-<epoch hex>-<96 bit random hex>` format
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(String);

impl TraceId {
    /// Generate a fresh trace id stamped with the current time
    pub fn new() -> Self {
        let epoch = Utc::now().timestamp() as u32;
        let random: [u8; 12] = rand::random();
        Self(format!("1-{epoch:08x}-{}", to_hex(&random)))
    }

    /// Parse and validate an existing trace id
    pub fn parse(input: &str) -> SharedResult<Self> {
        let mut parts = input.split('-');
        let valid = matches!(
            (parts.next(), parts.next(), parts.next(), parts.next()),
            (Some("1"), Some(epoch), Some(random), None)
                if is_hex(epoch, 8) && is_hex(random, 24)
        );

        if valid {
            Ok(Self(input.to_string()))
        } else {
            Err(SharedError::InvalidId {
                input: input.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 64 bit segment identifier rendered as 16 lowercase hex digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(String);

impl SegmentId {
    pub fn new() -> Self {
        let random: [u8; 8] = rand::random();
        Self(to_hex(&random))
    }

    pub fn parse(input: &str) -> SharedResult<Self> {
        if is_hex(input, 16) {
            Ok(Self(input.to_string()))
        } else {
            Err(SharedError::InvalidId {
                input: input.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SegmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current wall clock time as fractional epoch seconds
pub fn epoch_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn is_hex(input: &str, len: usize) -> bool {
    input.len() == len && input.chars().all(|c| c.is_ascii_hexdigit())
}
