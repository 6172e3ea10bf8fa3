//! The record of one invocation's sampled decisions.

use serde::{Deserialize, Serialize};

use super::Params;

/// What one transform did during an invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Name of the transform the entry was recorded for.
    pub transform: String,
    pub applied: bool,
    /// Empty when `applied` is false.
    #[serde(default, skip_serializing_if = "Params::is_empty")]
    pub params: Params,
}

impl TraceEntry {
    pub fn fired(transform: impl Into<String>, params: Params) -> Self {
        Self {
            transform: transform.into(),
            applied: true,
            params,
        }
    }

    pub fn skipped(transform: impl Into<String>) -> Self {
        Self {
            transform: transform.into(),
            applied: false,
            params: Params::new(),
        }
    }
}

/// One entry per transform, in pipeline order.
///
/// Append-only while sampling; afterwards it is plain data that can be
/// stored and replayed against any number of bundles.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplayTrace {
    pub entries: Vec<TraceEntry>,
}

impl ReplayTrace {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of transforms that fired.
    pub fn applied_count(&self) -> usize {
        self.entries.iter().filter(|e| e.applied).count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TraceEntry> {
        self.entries.iter()
    }
}
