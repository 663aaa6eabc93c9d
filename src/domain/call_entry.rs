use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::method::Method;

/// A method reached from a test, with the depth it was first discovered at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEntry {
    pub callee: Method,
    pub level: usize,
}

/// Test root -> reachable methods in discovery order.
///
/// Serializes as a map keyed by the root's canonical string, which is both
/// the binary snapshot layout and the JSON document layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallEntryIndex {
    entries: BTreeMap<Method, Vec<CallEntry>>,
}

impl CallEntryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, root: Method, entries: Vec<CallEntry>) {
        self.entries.insert(root, entries);
    }

    pub fn get(&self, root: &Method) -> Option<&[CallEntry]> {
        self.entries.get(root).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Method, &[CallEntry])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Number of test roots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_entries(&self) -> usize {
        self.iter().map(|(_, entries)| entries.len()).sum()
    }

    pub fn max_level(&self) -> usize {
        self.iter()
            .flat_map(|(_, entries)| entries)
            .map(|e| e.level)
            .max()
            .unwrap_or(0)
    }
}
