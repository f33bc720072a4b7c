//! Trace segment document model
//!
//! A [`Segment`] describes one traced unit of work. The JSON shape follows the
//! segment documents emitted by tracing SDKs: unknown keys are ignored and
//! missing keys fall back to defaults, so partially populated documents from
//! instrumentation under test still decode.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{SegmentId, TraceId, epoch_seconds};

/// One traced unit of work, possibly with nested subsegments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Segment {
    pub name: String,
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub start_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    #[serde(skip_serializing_if = "is_false")]
    pub in_progress: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub error: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub fault: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub throttle: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws: Option<Value>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub annotations: HashMap<String, Value>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, HashMap<String, Value>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subsegments: Vec<Segment>,
    /// Sampling decision. Never written to the wire; receivers set it.
    #[serde(skip_serializing)]
    pub sampled: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Segment {
    /// Begin a new root segment under the given trace
    pub fn begin(name: impl Into<String>, trace_id: &TraceId) -> Self {
        Self {
            name: name.into(),
            id: SegmentId::new().to_string(),
            trace_id: trace_id.to_string(),
            start_time: epoch_seconds(),
            in_progress: true,
            ..Default::default()
        }
    }

    /// Begin a subsegment parented on this segment
    pub fn begin_subsegment(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: SegmentId::new().to_string(),
            trace_id: self.trace_id.clone(),
            parent_id: Some(self.id.clone()),
            start_time: epoch_seconds(),
            in_progress: true,
            kind: Some("subsegment".to_string()),
            sampled: self.sampled,
            ..Default::default()
        }
    }

    /// Mark the segment finished now
    pub fn close(&mut self) {
        self.end_time = Some(epoch_seconds());
        self.in_progress = false;
    }

    pub fn annotate(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.annotations.insert(key.into(), value.into());
    }

    /// Attach metadata under a namespace (`default` when unsure)
    pub fn add_metadata(&mut self, namespace: &str, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata
            .entry(namespace.to_string())
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Elapsed seconds between start and end, if the segment is closed
    pub fn duration(&self) -> Option<f64> {
        self.end_time.map(|end| end - self.start_time)
    }

    /// Depth-first search for a subsegment with the given name
    pub fn find_subsegment(&self, name: &str) -> Option<&Segment> {
        self.subsegments
            .iter()
            .find_map(|sub| if sub.name == name { Some(sub) } else { sub.find_subsegment(name) })
    }
}
